use casefile_markup::ColorMode;
use casefile_ui::widgets::ButtonLayout;
use casefile_ui::{Color, Rect, Vec2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub content_path: String,
    pub log_path:     String,
    pub log_level:    String,
    /// Fixed frame step used by the headless runner.
    pub frame_ms:     u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorPalette {
    pub normal:   Color,
    pub aside:    Color,
    pub emphasis: Color,
}

impl ColorPalette {
    pub fn color(&self, mode: ColorMode) -> Color {
        match mode {
            ColorMode::Normal => self.normal,
            ColorMode::Aside => self.aside,
            ColorMode::Emphasis => self.emphasis,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    pub text_area: Rect,
    pub padding: f32,
    pub font: String,
    pub font_size: f32,
    /// Where a presented evidence icon is drawn, relative to `text_area`.
    pub evidence_anchor: Vec2,
    pub ms_per_char: u32,
    pub mute_audio_on_skip: bool,
    /// Colour parenthesised text as an aside without an explicit tag.
    pub auto_aside: bool,
    pub palette: ColorPalette,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuLabels {
    pub talk:    String,
    pub present: String,
    pub back:    String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterConfig {
    pub menu_area: Rect,
    pub menu_layout: ButtonLayout,
    pub labels: MenuLabels,
    pub fade_ms: u32,
    pub panel_slide_ms: u32,
    /// Vertical distance the bottom panel travels off-screen.
    pub panel_offset: f32,
    pub actor_slide_ms: u32,
    pub actor_slide_delay_ms: u32,
    pub actor_offset: f32,
    pub picker_fade_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            content_path: "demos/detention_center.toml".into(),
            log_path:     "logs/".into(),
            log_level:    "info".into(),
            frame_ms:     16,
        }
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self {
            normal:   Color::WHITE,
            aside:    Color::rgb(135, 206, 250),
            emphasis: Color::rgb(255, 120, 80),
        }
    }
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            text_area: Rect::new(40.0, 520.0, 1200.0, 180.0),
            padding: 18.0,
            font: "fonts/dialogue.ttf".into(),
            font_size: 28.0,
            evidence_anchor: Vec2::new(0.85, 0.0),
            ms_per_char: 33,
            mute_audio_on_skip: false,
            auto_aside: true,
            palette: ColorPalette::default(),
        }
    }
}

impl Default for MenuLabels {
    fn default() -> Self {
        Self {
            talk:    "Talk".into(),
            present: "Present".into(),
            back:    "Back".into(),
        }
    }
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            menu_area: Rect::new(780.0, 120.0, 460.0, 380.0),
            menu_layout: ButtonLayout::default(),
            labels: MenuLabels::default(),
            fade_ms: 300,
            panel_slide_ms: 350,
            panel_offset: 220.0,
            actor_slide_ms: 450,
            actor_slide_delay_ms: 150,
            actor_offset: 640.0,
            picker_fade_ms: 200,
        }
    }
}
