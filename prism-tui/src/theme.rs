//! SynthBrute theme and color utilities.

use crate::notifications::NotificationLevel;
use prism_core::{LoadState, StrengthTier};
use ratatui::style::Color;

#[derive(Debug, Clone)]
pub struct SynthBruteTheme {
    pub bg: Color,
    pub bg_secondary: Color,
    pub bg_highlight: Color,
    pub primary: Color,
    pub primary_dim: Color,
    pub secondary: Color,
    pub secondary_dim: Color,
    pub tertiary: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub text: Color,
    pub text_dim: Color,
    pub text_muted: Color,
    pub border: Color,
    pub border_focus: Color,
}

impl SynthBruteTheme {
    pub fn synthbrute() -> Self {
        Self {
            bg: Color::Rgb(10, 10, 10),
            bg_secondary: Color::Rgb(26, 26, 26),
            bg_highlight: Color::Rgb(42, 42, 42),
            primary: Color::Rgb(0, 255, 255),
            primary_dim: Color::Rgb(0, 136, 136),
            secondary: Color::Rgb(255, 0, 255),
            secondary_dim: Color::Rgb(136, 0, 136),
            tertiary: Color::Rgb(255, 255, 0),
            success: Color::Rgb(0, 255, 0),
            warning: Color::Rgb(255, 255, 0),
            error: Color::Rgb(255, 0, 0),
            info: Color::Rgb(0, 255, 255),
            text: Color::Rgb(255, 255, 255),
            text_dim: Color::Rgb(136, 136, 136),
            text_muted: Color::Rgb(68, 68, 68),
            border: Color::Rgb(68, 68, 68),
            border_focus: Color::Rgb(0, 255, 255),
        }
    }
}

impl Default for SynthBruteTheme {
    fn default() -> Self {
        Self::synthbrute()
    }
}

/// Edge and card color for a correlation strength tier.
pub fn strength_tier_color(tier: StrengthTier, theme: &SynthBruteTheme) -> Color {
    match tier {
        StrengthTier::Strong => theme.success,
        StrengthTier::Medium => theme.warning,
        StrengthTier::Weak => theme.error,
    }
}

/// Alternate color for animated edges on odd ticks.
pub fn pulse_color(tier: StrengthTier, tick: u64, theme: &SynthBruteTheme) -> Color {
    if tick % 2 == 0 {
        strength_tier_color(tier, theme)
    } else {
        theme.text
    }
}

pub fn confidence_color(confidence: Option<f64>, theme: &SynthBruteTheme) -> Color {
    match confidence {
        Some(c) if c >= 0.8 => theme.success,
        Some(c) if c >= 0.5 => theme.warning,
        Some(_) => theme.error,
        None => theme.text_dim,
    }
}

pub fn notification_color(level: NotificationLevel, theme: &SynthBruteTheme) -> Color {
    match level {
        NotificationLevel::Info => theme.info,
        NotificationLevel::Warning => theme.warning,
        NotificationLevel::Error => theme.error,
        NotificationLevel::Success => theme.success,
    }
}

pub fn load_state_color(state: LoadState, theme: &SynthBruteTheme) -> Color {
    match state {
        LoadState::Loading => theme.tertiary,
        LoadState::Ready => theme.primary_dim,
    }
}
