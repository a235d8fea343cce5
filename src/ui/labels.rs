//! Rate labels drawn at the top of each view panel

use crate::gfx::rendering::view_panel::PanelRect;

/// Distance of the label from the top edge of its panel
pub const LABEL_TOP_MARGIN: f32 = 15.0;

/// `"<graphics> Hz / <haptics> Hz"` with no decimals
pub fn rate_label(graphics_hz: f64, haptics_hz: f64) -> String {
    format!("{:.0} Hz / {:.0} Hz", graphics_hz, haptics_hz)
}

/// Top-left corner that centers a label of `text_width` pixels in `panel`
pub fn label_position(panel: &PanelRect, text_width: f32) -> [f32; 2] {
    [
        panel.x as f32 + 0.5 * (panel.width as f32 - text_width),
        panel.y as f32 + LABEL_TOP_MARGIN,
    ]
}

/// Draws `text` in white, centered at the top of every panel
pub fn draw_rate_labels(ui: &imgui::Ui, panels: &[PanelRect], text: &str) {
    let text_width = ui.calc_text_size(text)[0];
    let draw_list = ui.get_foreground_draw_list();
    for panel in panels.iter().filter(|p| !p.is_empty()) {
        draw_list.add_text(label_position(panel, text_width), [1.0, 1.0, 1.0, 1.0], text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_label_rounds() {
        assert_eq!(rate_label(59.6, 998.4), "60 Hz / 998 Hz");
        assert_eq!(rate_label(0.0, 0.0), "0 Hz / 0 Hz");
    }

    #[test]
    fn test_label_centered_in_panel() {
        let panel = PanelRect { x: 640, y: 0, width: 640, height: 720 };
        assert_eq!(label_position(&panel, 100.0), [910.0, 15.0]);
    }
}
