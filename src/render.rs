use crate::config::RenderConfig;
use crate::layout::CloudLayout;
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

pub fn render_svg(layout: &CloudLayout, theme: &Theme) -> String {
    let mut svg = String::new();
    let width = layout.width.max(1.0);
    let height = layout.height.max(1.0);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        escape_xml(&theme.background)
    ));

    svg.push_str(&format!(
        "<g font-family=\"{}\" font-weight=\"{}\">",
        escape_xml(&theme.font_family),
        escape_xml(&theme.font_weight)
    ));
    for word in &layout.words {
        let transform = if word.rotated {
            format!(
                " transform=\"rotate(90 {:.2} {:.2})\"",
                word.anchor_x, word.anchor_y
            )
        } else {
            String::new()
        };
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"{:.2}\" fill=\"{}\"{}>{}</text>",
            word.anchor_x,
            word.anchor_y,
            word.font_size,
            escape_xml(&word.color),
            transform,
            escape_xml(&word.text)
        ));
    }
    svg.push_str("</g>");
    svg.push_str("</svg>");
    svg
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .or_else(|| usvg::Size::from_wh(800.0, 600.0))
        .ok_or_else(|| anyhow::anyhow!("Invalid render size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig) -> Result<()> {
    Err(anyhow::anyhow!(
        "PNG output requires the `png` feature"
    ))
}

pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PlacedWord;

    fn word(text: &str, rotated: bool) -> PlacedWord {
        PlacedWord {
            text: text.to_string(),
            weight: 1.0,
            font_size: 24.0,
            rotated,
            x: 10.0,
            y: 20.0,
            width: 60.0,
            height: 24.0,
            anchor_x: 10.0,
            anchor_y: 39.0,
            color: "#123456".to_string(),
        }
    }

    #[test]
    fn render_svg_basic() {
        let layout = CloudLayout {
            width: 300.0,
            height: 200.0,
            words: vec![word("Alpha", false), word("R&D", true)],
            failed: Vec::new(),
            canceled: false,
        };
        let svg = render_svg(&layout, &Theme::modern());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(">Alpha</text>"));
        assert!(svg.contains("R&amp;D"));
        assert!(svg.contains("transform=\"rotate(90 10.00 39.00)\""));
        assert_eq!(svg.matches("<text").count(), 2);
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_xml("<a href='x'>&"), "&lt;a href=&apos;x&apos;&gt;&amp;");
    }
}
