//! SVG renderer: converts `RenderCommand` lists into standalone SVG strings.

use tracklane_protocol::{Interpolation, Point, RenderCommand, TextAlign, ThemeToken};

use crate::curve::{PathStep, outline};

/// Render a list of commands as an SVG document string.
///
/// `width` and `height` define the SVG viewBox dimensions.
/// `dark` selects the color palette.
pub fn render_svg(commands: &[RenderCommand], width: f64, height: f64, dark: bool) -> String {
    let mut svg = String::with_capacity(commands.len() * 120);
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}" style="font-family:system-ui,-apple-system,sans-serif;font-size:11px">"#,
    ));
    let bg = resolve_color(ThemeToken::Background, dark);
    svg.push_str(&format!(
        r#"<rect width="{width}" height="{height}" fill="{bg}"/>"#,
    ));

    let mut clips = 0_usize;
    for cmd in commands {
        match cmd {
            RenderCommand::DrawRect {
                rect,
                color,
                border_color,
                label,
                opacity,
            } => {
                let fill = resolve_color(*color, dark);
                svg.push_str(&format!(
                    r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{fill}""#,
                    rect.x, rect.y, rect.w, rect.h,
                ));
                if *opacity < 1.0 {
                    svg.push_str(&format!(r#" fill-opacity="{opacity}""#));
                }
                if let Some(border) = border_color {
                    svg.push_str(&format!(
                        r#" stroke="{}" stroke-width="0.5""#,
                        resolve_color(*border, dark)
                    ));
                }
                svg.push('>');
                if let Some(label) = label {
                    svg.push_str(&format!("<title>{}</title>", escape_xml(label)));
                }
                svg.push_str("</rect>");

                if let Some(label) = label
                    && rect.w > 30.0
                {
                    let text_color = resolve_color(ThemeToken::TextPrimary, dark);
                    let tx = rect.x + 3.0;
                    let ty = rect.y + rect.h * 0.75;
                    let max_chars = (rect.w / 7.0) as usize;
                    let text = if label.chars().count() > max_chars && max_chars > 2 {
                        let truncated: String = label.chars().take(max_chars - 1).collect();
                        format!("{truncated}…")
                    } else {
                        label.clone()
                    };
                    svg.push_str(&format!(
                        r#"<text x="{tx}" y="{ty}" fill="{text_color}" style="pointer-events:none">{}</text>"#,
                        escape_xml(&text),
                    ));
                }
            }
            RenderCommand::FillArea {
                id,
                points,
                baseline,
                color,
                interpolation,
            } => {
                if points.is_empty() {
                    continue;
                }
                svg.push_str(&format!(
                    r#"<path id="{}" d="{}" fill="{}"/>"#,
                    escape_xml(id),
                    area_path(points, *baseline, *interpolation),
                    color.to_hex(),
                ));
            }
            RenderCommand::DrawLine {
                from,
                to,
                color,
                width: line_width,
            } => {
                let stroke = resolve_color(*color, dark);
                svg.push_str(&format!(
                    r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{stroke}" stroke-width="{line_width}"/>"#,
                    from.x, from.y, to.x, to.y,
                ));
            }
            RenderCommand::DrawText {
                text,
                position,
                color,
                font_size,
                align,
            } => {
                let fill = resolve_color(*color, dark);
                let anchor = match align {
                    TextAlign::Left => "start",
                    TextAlign::Center => "middle",
                    TextAlign::Right => "end",
                };
                svg.push_str(&format!(
                    r#"<text x="{}" y="{}" fill="{fill}" font-size="{font_size}" text-anchor="{anchor}">{}</text>"#,
                    position.x,
                    position.y,
                    escape_xml(text),
                ));
            }
            RenderCommand::SetClip { rect } => {
                clips += 1;
                svg.push_str(&format!(
                    r#"<clipPath id="clip-{clips}"><rect x="{}" y="{}" width="{}" height="{}"/></clipPath><g clip-path="url(#clip-{clips})">"#,
                    rect.x, rect.y, rect.w, rect.h,
                ));
            }
            RenderCommand::PushTransform { translate } => {
                svg.push_str(&format!(
                    r#"<g transform="translate({} {})">"#,
                    translate.x, translate.y
                ));
            }
            RenderCommand::BeginGroup { id, label } => {
                svg.push_str(&format!(r#"<g id="{}">"#, escape_xml(id)));
                if let Some(label) = label {
                    svg.push_str(&format!("<title>{}</title>", escape_xml(label)));
                }
            }
            RenderCommand::ClearClip | RenderCommand::PopTransform | RenderCommand::EndGroup => {
                svg.push_str("</g>");
            }
        }
    }

    svg.push_str("</svg>");
    svg
}

/// Closed outline of the area between `points` and `baseline`.
fn area_path(points: &[Point], baseline: f64, interpolation: Interpolation) -> String {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return String::new();
    };
    let mut d = String::with_capacity(points.len() * 24);
    d.push_str(&format!("M{},{}L{},{}", first.x, baseline, first.x, first.y));
    for step in outline(points, interpolation) {
        match step {
            PathStep::Line(p) => d.push_str(&format!("L{},{}", p.x, p.y)),
            PathStep::Cubic(c1, c2, p) => d.push_str(&format!(
                "C{},{} {},{} {},{}",
                c1.x, c1.y, c2.x, c2.y, p.x, p.y
            )),
        }
    }
    d.push_str(&format!("L{},{}Z", last.x, baseline));
    d
}

fn resolve_color(token: ThemeToken, dark: bool) -> &'static str {
    if dark {
        match token {
            ThemeToken::Background => "#181818",
            ThemeToken::TrackBackground => "#1f1f1f",
            ThemeToken::TrackBorder | ThemeToken::BlockBorder => "#303030",
            ThemeToken::TextPrimary => "#ececec",
            ThemeToken::TextMuted | ThemeToken::AxisText => "#9e9e9e",
            ThemeToken::AxisLine => "#616161",
            ThemeToken::BlockFill => "#448aff",
            ThemeToken::AreaFill => "#42a5f5",
            ThemeToken::SelectionHighlight => "#ffd600",
        }
    } else {
        match token {
            ThemeToken::Background => "#ffffff",
            ThemeToken::TrackBackground => "#f8f9fa",
            ThemeToken::TrackBorder | ThemeToken::BlockBorder => "#dee2e6",
            ThemeToken::TextPrimary => "#1a1a2e",
            ThemeToken::TextMuted | ThemeToken::AxisText => "#666677",
            ThemeToken::AxisLine => "#999999",
            ThemeToken::BlockFill => "#457b9d",
            ThemeToken::AreaFill => "#adb5bd",
            ThemeToken::SelectionHighlight => "#ffd60a",
        }
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
