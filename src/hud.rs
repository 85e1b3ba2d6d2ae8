//! Points HUD and the floating "Total: N pts" popup.

use crate::config::PetConfig;
use crate::interaction::InteractionEvent;
use crate::points::PointsChanged;
use bevy::prelude::*;

const LABEL_COLOR: (f32, f32, f32) = (0.95, 0.88, 0.45);
const POPUP_COLOR: (f32, f32, f32) = (1.0, 0.92, 0.2);
const POPUP_WIDTH: f32 = 300.0;
const POPUP_HEIGHT: f32 = 60.0;

// ── Points label ──────────────────────────────────────────────────────────────

/// Top-left points label.  Remembers what it last showed so repeated
/// notifications with the same total do not touch the text.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct PointsText {
    prefix: String,
    hide_when_zero: bool,
    displayed: Option<u64>,
}

impl PointsText {
    pub fn new(prefix: impl Into<String>, hide_when_zero: bool) -> Self {
        Self {
            prefix: prefix.into(),
            hide_when_zero,
            displayed: None,
        }
    }

    pub fn displayed(&self) -> Option<u64> {
        self.displayed
    }

    /// New `(label, visible)` for `points`, or `None` if nothing changed.
    pub fn render(&mut self, points: u64) -> Option<(String, bool)> {
        if self.displayed == Some(points) {
            return None;
        }
        self.displayed = Some(points);
        let visible = !(self.hide_when_zero && points == 0);
        Some((format!("{}{}", self.prefix, points), visible))
    }
}

pub fn setup_points_hud(mut commands: Commands, config: Res<PetConfig>) {
    let mut label = PointsText::new(config.points_prefix.clone(), config.hide_points_when_zero);
    let (text, visible) = label.render(0).unwrap_or_default();
    let (r, g, b) = LABEL_COLOR;

    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(10.0),
            top: Val::Px(10.0),
            ..default()
        },
        Text::new(text),
        TextFont {
            font_size: config.points_font_size,
            ..default()
        },
        TextColor(Color::srgb(r, g, b)),
        visibility(visible),
        label,
    ));
}

fn visibility(visible: bool) -> Visibility {
    if visible {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    }
}

/// Re-render the label from the latest [`PointsChanged`] of this frame.
pub fn points_hud_system(
    mut changed: MessageReader<PointsChanged>,
    mut labels: Query<(&mut PointsText, &mut Text, &mut Visibility)>,
) {
    let Some(latest) = changed.read().last().map(|c| c.points) else {
        return;
    };
    for (mut label, mut text, mut vis) in labels.iter_mut() {
        if let Some((rendered, visible)) = label.render(latest) {
            *text = Text::new(rendered);
            *vis = visibility(visible);
        }
    }
}

// ── Floating popup ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatingTextStyle {
    /// Seconds on screen.
    pub duration: f32,
    /// Pixels risen over the full duration.
    pub rise: f32,
    /// Pixels above the anchor's screen position where the popup starts.
    pub offset: f32,
    pub font_size: f32,
}

/// Animation sample for a floating popup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatingFrame {
    /// Fraction of `rise` covered so far.
    pub rise: f32,
    pub alpha: f32,
    pub scale: f32,
}

/// Linear rise, opaque for the first half then a linear fade, and a
/// sine pulse of up to 30% in size.
pub fn floating_text_frame(progress: f32) -> FloatingFrame {
    let p = progress.clamp(0.0, 1.0);
    let alpha = if p < 0.5 { 1.0 } else { 1.0 - (p - 0.5) * 2.0 };
    FloatingFrame {
        rise: p,
        alpha,
        scale: 1.0 + (std::f32::consts::PI * p).sin() * 0.3,
    }
}

#[derive(Component, Debug, Clone)]
pub struct FloatingText {
    pub age: f32,
    pub style: FloatingTextStyle,
    /// Node `top` at spawn (px).
    pub start_top: f32,
}

/// Spawn a popup above the body for every inspect click.
pub fn spawn_floating_text_system(
    mut commands: Commands,
    mut interactions: MessageReader<InteractionEvent>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera2d>>,
    config: Res<PetConfig>,
) {
    let style = config.floating_text_style();
    for event in interactions.read() {
        let InteractionEvent::ShowPoints { anchor, points } = *event else {
            continue;
        };
        let Ok((camera, camera_transform)) = cameras.single() else {
            warn!("No camera - cannot place points popup");
            continue;
        };
        let Ok(screen) = camera.world_to_viewport(camera_transform, anchor.extend(0.0)) else {
            continue;
        };

        let start_top = screen.y - style.offset - POPUP_HEIGHT * 0.5;
        let (r, g, b) = POPUP_COLOR;
        commands.spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(screen.x - POPUP_WIDTH * 0.5),
                top: Val::Px(start_top),
                width: Val::Px(POPUP_WIDTH),
                height: Val::Px(POPUP_HEIGHT),
                ..default()
            },
            Text::new(format!("Total: {} pts", points)),
            TextFont {
                font_size: style.font_size,
                ..default()
            },
            TextColor(Color::srgba(r, g, b, 1.0)),
            FloatingText {
                age: 0.0,
                style,
                start_top,
            },
        ));
    }
}

pub fn floating_text_system(
    mut commands: Commands,
    time: Res<Time>,
    mut popups: Query<(Entity, &mut FloatingText, &mut Node, &mut TextColor, &mut TextFont)>,
) {
    let dt = time.delta_secs();
    let (r, g, b) = POPUP_COLOR;

    for (entity, mut popup, mut node, mut color, mut font) in popups.iter_mut() {
        popup.age += dt;
        if popup.age >= popup.style.duration {
            commands.entity(entity).despawn();
            continue;
        }

        let frame = floating_text_frame(popup.age / popup.style.duration);
        node.top = Val::Px(popup.start_top - popup.style.rise * frame.rise);
        *color = TextColor(Color::srgba(r, g, b, frame.alpha));
        font.font_size = popup.style.font_size * frame.scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_renders_prefix_and_skips_repeats() {
        let mut label = PointsText::new("Points: ", false);
        assert_eq!(label.render(3), Some(("Points: 3".to_string(), true)));
        assert_eq!(label.render(3), None);
        assert_eq!(label.render(4), Some(("Points: 4".to_string(), true)));
        assert_eq!(label.displayed(), Some(4));
    }

    #[test]
    fn label_hides_at_zero_when_asked() {
        let mut label = PointsText::new("Points: ", true);
        assert_eq!(label.render(0), Some(("Points: 0".to_string(), false)));
        assert_eq!(label.render(1), Some(("Points: 1".to_string(), true)));
    }

    #[test]
    fn popup_curve() {
        let start = floating_text_frame(0.0);
        assert_eq!(start.alpha, 1.0);
        assert!((start.scale - 1.0).abs() < 1e-6);

        let mid = floating_text_frame(0.5);
        assert_eq!(mid.alpha, 1.0);
        assert!((mid.scale - 1.3).abs() < 1e-6);
        assert!((mid.rise - 0.5).abs() < 1e-6);

        let late = floating_text_frame(0.75);
        assert!((late.alpha - 0.5).abs() < 1e-6);

        let end = floating_text_frame(1.0);
        assert!(end.alpha.abs() < 1e-6);
        assert!((end.scale - 1.0).abs() < 1e-5);
    }
}
