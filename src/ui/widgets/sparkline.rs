//! Mini sparkline widget for price history

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

const BAR_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// A compact inline sparkline (single line), scaled between the series
/// min and max so small moves on a large price stay visible
pub struct MiniSparkline<'a> {
    data: &'a [u64],
    style: Style,
}

impl<'a> MiniSparkline<'a> {
    pub fn new(data: &'a [u64]) -> Self {
        Self {
            data,
            style: Style::default().fg(Color::Cyan),
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

impl<'a> Widget for MiniSparkline<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 || self.data.is_empty() {
            return;
        }
        for (i, ch) in sparkline_text(self.data, area.width as usize)
            .chars()
            .enumerate()
        {
            let x = area.x + i as u16;
            buf.get_mut(x, area.y).set_char(ch).set_style(self.style);
        }
    }
}

/// Format the last `width` points as bar characters
pub fn sparkline_text(data: &[u64], width: usize) -> String {
    let data_len = data.len().min(width);
    let window = &data[data.len() - data_len..];
    let (Some(min), Some(max)) = (window.iter().min(), window.iter().max()) else {
        return String::new();
    };
    let span = (max - min).max(1) as f64;

    window
        .iter()
        .map(|&value| {
            let scaled = if max == min {
                3
            } else {
                (((value - min) as f64 / span) * 7.0).round() as usize
            };
            BAR_CHARS[scaled.min(7)]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparkline_text() {
        let data = [1, 2, 3, 4, 5, 6, 7, 8];
        let text = sparkline_text(&data, 8);
        assert_eq!(text, "▁▂▃▄▅▆▇█");
    }

    #[test]
    fn test_sparkline_uses_window_range() {
        let data = [265000, 265100, 265000, 265200];
        let text: Vec<char> = sparkline_text(&data, 10).chars().collect();
        assert_eq!(text.first(), Some(&'▁'));
        assert_eq!(text.last(), Some(&'█'));
    }

    #[test]
    fn test_sparkline_flat_and_truncated() {
        assert_eq!(sparkline_text(&[5, 5, 5], 2), "▄▄");
        let data: [u64; 0] = [];
        assert!(sparkline_text(&data, 8).is_empty());
    }
}
