use egui::{Color32, Visuals};
use serde::{Deserialize, Serialize};
use sysmon_core::{alert::Metric, history::Series};

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[must_use]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub const fn from_dark(dark: bool) -> Self {
        if dark {
            Self::Dark
        } else {
            Self::Light
        }
    }

    pub const fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub const fn palette(self) -> &'static Palette {
        match self {
            Self::Dark => &Palette::DARK,
            Self::Light => &Palette::LIGHT,
        }
    }

    /// Label for the button that switches away from this theme.
    #[must_use]
    pub const fn toggle_label(self) -> &'static str {
        match self {
            Self::Dark => "☀ Light",
            Self::Light => "🌙 Dark",
        }
    }

    pub fn visuals(self) -> Visuals {
        let palette = self.palette();
        let mut visuals = if self.is_dark() {
            Visuals::dark()
        } else {
            Visuals::light()
        };
        visuals.panel_fill = palette.background;
        visuals.window_fill = palette.card;
        visuals.extreme_bg_color = palette.chart_bg;
        visuals.faint_bg_color = palette.card;
        visuals.override_text_color = Some(palette.text);
        visuals.selection.bg_fill = palette.cpu;
        visuals.hyperlink_color = palette.cpu;
        visuals
    }
}

impl AsRef<str> for Theme {
    fn as_ref(&self) -> &str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }
}

/// Colors used by the dashboard.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[must_use]
pub struct Palette {
    pub background: Color32,
    pub card: Color32,
    pub text: Color32,
    pub muted: Color32,
    pub chart_bg: Color32,
    pub grid: Color32,
    pub cpu: Color32,
    pub ram: Color32,
    pub disk: Color32,
    pub net_recv: Color32,
    pub net_sent: Color32,
    pub fps: Color32,
    pub alert: Color32,
}

impl Palette {
    const CPU: Color32 = Color32::from_rgb(0x7B, 0x68, 0xEE);
    const RAM: Color32 = Color32::from_rgb(0x50, 0xC8, 0x78);
    const DISK: Color32 = Color32::from_rgb(0xFF, 0xD7, 0x00);
    const NET_RECV: Color32 = Color32::from_rgb(0x93, 0x70, 0xDB);
    const NET_SENT: Color32 = Color32::from_rgb(0x20, 0xB2, 0xAA);
    const FPS: Color32 = Color32::from_rgb(0xFF, 0x8C, 0x00);
    const ALERT: Color32 = Color32::from_rgb(0xFF, 0x52, 0x52);

    pub const DARK: Self = Self {
        background: Color32::from_rgb(0x1E, 0x1E, 0x2E),
        card: Color32::from_rgb(0x2D, 0x2D, 0x3F),
        text: Color32::WHITE,
        muted: Color32::from_rgb(0xA0, 0xA0, 0xB8),
        chart_bg: Color32::from_rgb(0x2A, 0x2A, 0x3A),
        grid: Color32::from_rgb(0x3F, 0x3F, 0x5F),
        cpu: Self::CPU,
        ram: Self::RAM,
        disk: Self::DISK,
        net_recv: Self::NET_RECV,
        net_sent: Self::NET_SENT,
        fps: Self::FPS,
        alert: Self::ALERT,
    };

    pub const LIGHT: Self = Self {
        background: Color32::from_rgb(0xF0, 0xF0, 0xF5),
        card: Color32::from_rgb(0xE0, 0xE0, 0xE8),
        text: Color32::from_rgb(0x33, 0x33, 0x33),
        muted: Color32::from_rgb(0x70, 0x70, 0x80),
        chart_bg: Color32::from_rgb(0xF8, 0xF8, 0xFA),
        grid: Color32::from_rgb(0xDD, 0xDD, 0xDD),
        ..Self::DARK
    };

    pub const fn series(&self, series: Series) -> Color32 {
        match series {
            Series::Cpu => self.cpu,
            Series::Ram => self.ram,
            Series::Disk | Series::DiskRead => self.disk,
            Series::DiskWrite => self.fps,
            Series::NetRecv => self.net_recv,
            Series::NetSent => self.net_sent,
            Series::Fps => self.fps,
        }
    }

    pub const fn metric(&self, metric: Metric) -> Color32 {
        match metric {
            Metric::Cpu | Metric::Temp => self.cpu,
            Metric::Ram => self.ram,
            Metric::Disk => self.disk,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_round_trips() {
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Dark.toggled().toggled(), Theme::Dark);
        assert_eq!(Theme::from_dark(false), Theme::Light);
    }

    #[test]
    fn series_colors_match_across_themes() {
        for series in Series::ALL {
            assert_eq!(
                Palette::DARK.series(series),
                Palette::LIGHT.series(series),
                "{}",
                series.as_ref()
            );
        }
        assert_ne!(Palette::DARK.chart_bg, Palette::LIGHT.chart_bg);
    }

    #[test]
    fn visuals_follow_theme() {
        assert!(Theme::Dark.visuals().dark_mode);
        assert!(!Theme::Light.visuals().dark_mode);
        assert_eq!(Theme::Light.visuals().panel_fill, Palette::LIGHT.background);
    }
}
