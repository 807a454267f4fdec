use crate::config::{RenderConfig, TextConfig};
use crate::label::Side;
use crate::scene::Scene;
use crate::text_metrics::strip_markup;
use crate::view::HostView;
use anyhow::Result;
use std::path::Path;

// Width of the arrow drawn between the box and its anchor.
const ARROW: f64 = 6.0;

/// SVG picture of the viewport: one anchor dot per open label and the label
/// box where its container currently sits.
pub fn render_svg(scene: &Scene, text: &TextConfig, render: &RenderConfig) -> String {
    let view = scene.view();
    let size = view.size();
    let width = size.x.max(1.0);
    let height = size.y.max(1.0);
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        render.background
    ));

    let line_height = text.font_size * text.line_height;

    for label in scene.labels().filter(|label| label.is_open()) {
        let Some(node) = label.container() else {
            continue;
        };
        let snapshot = node.snapshot();

        if let Some(anchor) = label.anchor() {
            let point = view.lat_lng_to_container_point(anchor);
            svg.push_str(&format!(
                "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"4\" fill=\"{}\"/>",
                point.x, point.y, render.anchor_color
            ));
        }

        let (Some(position), Some(side)) = (label.position(), label.side()) else {
            continue;
        };
        if !snapshot.visible {
            continue;
        }

        let origin = view.layer_point_to_container_point(position);
        let visible = strip_markup(&snapshot.html);
        let lines: Vec<&str> = visible.lines().collect();
        let box_w = snapshot.width;
        let box_h = lines.len().max(1) as f64 * line_height + text.padding_y * 2.0;
        let mid_y = origin.y + box_h / 2.0;

        svg.push_str(&format!("<g opacity=\"{:.2}\">", snapshot.opacity));
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{box_w:.2}\" height=\"{box_h:.2}\" rx=\"4\" ry=\"4\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
            origin.x, origin.y, render.label_fill, render.label_border
        ));

        let (edge_x, tip_x) = match side {
            Side::Right => (origin.x, origin.x - ARROW),
            Side::Left => (origin.x + box_w, origin.x + box_w + ARROW),
        };
        svg.push_str(&format!(
            "<path d=\"M {edge_x:.2} {:.2} L {tip_x:.2} {mid_y:.2} L {edge_x:.2} {:.2} z\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
            mid_y - ARROW,
            mid_y + ARROW,
            render.label_fill,
            render.label_border
        ));

        svg.push_str(&text_block_svg(
            origin.x + text.padding_x,
            origin.y + text.padding_y,
            &lines,
            text,
            render,
        ));
        svg.push_str("</g>");
    }

    svg.push_str("</svg>");
    svg
}

fn text_block_svg(x: f64, y: f64, lines: &[&str], text: &TextConfig, render: &RenderConfig) -> String {
    let line_height = text.font_size * text.line_height;
    let start_y = y + (line_height + text.font_size) / 2.0 - text.font_size * 0.15;
    let mut out = String::new();

    out.push_str(&format!(
        "<text x=\"{x:.2}\" y=\"{start_y:.2}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">",
        escape_xml(&text.font_family),
        text.font_size,
        render.label_text
    ));
    for (idx, line) in lines.iter().enumerate() {
        let dy = if idx == 0 { 0.0 } else { line_height };
        out.push_str(&format!(
            "<tspan x=\"{x:.2}\" dy=\"{dy:.2}\">{}</tspan>",
            escape_xml(line)
        ));
    }
    out.push_str("</text>");
    out
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
pub fn write_output_png(svg: &str, output: &Path, text: &TextConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = text.font_family.clone();
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
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
    use crate::config::{Config, Direction, Environment, LabelOptions};
    use crate::geo::Point;
    use crate::label::Label;

    fn scene_with(options: LabelOptions, content: &str) -> (Scene, Config) {
        let config = Config {
            text: TextConfig {
                char_width: Some(7.0),
                ..TextConfig::default()
            },
            ..Config::default()
        };
        let mut scene = Scene::new(&config);
        let anchor = scene.view().container_point_to_lat_lng(Point::new(200.0, 150.0));
        let label = Label::new(options, Environment::default(), None)
            .with_lat_lng(anchor)
            .with_content(content);
        let id = scene.add_label(label);
        scene.open_label(id);
        (scene, config)
    }

    #[test]
    fn render_svg_basic() {
        let (scene, config) = scene_with(LabelOptions::default(), "Tower <b>Bridge</b>");
        let svg = render_svg(&scene, &config.text, &config.render);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("width=\"800\""));
        assert!(svg.contains("Tower Bridge"));
        assert!(svg.contains("<circle cx=\"200.00\" cy=\"150.00\""));
        assert!(svg.contains("<rect x=\"212.00\" y=\"135.00\""));
    }

    #[test]
    fn escapes_label_text() {
        let (scene, config) = scene_with(
            LabelOptions {
                direction: Direction::Left,
                ..LabelOptions::default()
            },
            "a &amp; b &lt;c&gt;",
        );
        let svg = render_svg(&scene, &config.text, &config.render);
        assert!(svg.contains("a &amp; b &lt;c&gt;"));
    }

    #[test]
    fn closed_labels_are_not_drawn() {
        let (mut scene, config) = scene_with(LabelOptions::default(), "Gone");
        let id = scene.labels().next().map(Label::id).expect("label");
        scene.close_label(id);
        let svg = render_svg(&scene, &config.text, &config.render);
        assert!(!svg.contains("Gone"));
        assert!(!svg.contains("<circle"));
    }
}
