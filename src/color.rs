use eframe::egui::Color32;

pub const NEGATIVE_RED: Color32 = Color32::from_rgb(255, 0, 0);
pub const NEUTRAL_GRAY: Color32 = Color32::from_rgb(236, 236, 236);
pub const POSITIVE_GREEN: Color32 = Color32::from_rgb(0, 128, 0);
pub const SUBJECTIVE_BLUE: Color32 = Color32::from_rgb(68, 103, 196);

const SENTIMENT_SCALE: [(f32, Color32); 3] =
    [(-1.0, NEGATIVE_RED), (0.0, NEUTRAL_GRAY), (1.0, POSITIVE_GREEN)];
const SUBJECTIVITY_SCALE: [(f32, Color32); 2] = [(0.0, NEUTRAL_GRAY), (1.0, SUBJECTIVE_BLUE)];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColorMode {
    #[default]
    Sentiment,
    Subjectivity,
}

impl ColorMode {
    pub const ALL: [Self; 2] = [Self::Sentiment, Self::Subjectivity];

    pub fn label(self) -> &'static str {
        match self {
            Self::Sentiment => "Sentiment",
            Self::Subjectivity => "Subjectivity",
        }
    }

    pub fn legend_labels(self) -> (&'static str, &'static str) {
        match self {
            Self::Sentiment => ("Negative", "Positive"),
            Self::Subjectivity => ("Objective", "Subjective"),
        }
    }

    fn scale(self) -> &'static [(f32, Color32)] {
        match self {
            Self::Sentiment => &SENTIMENT_SCALE,
            Self::Subjectivity => &SUBJECTIVITY_SCALE,
        }
    }
}

fn lerp_color(from: Color32, to: Color32, t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let channel = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
    Color32::from_rgb(
        channel(from.r(), to.r()),
        channel(from.g(), to.g()),
        channel(from.b(), to.b()),
    )
}

/// Piecewise-linear lookup over the mode's control points. Values outside the domain take the
/// nearest endpoint color; NaN maps to the scale midpoint color.
pub fn color_for(value: f32, mode: ColorMode) -> Color32 {
    let scale = mode.scale();
    let (first_value, first_color) = scale[0];
    let (last_value, last_color) = scale[scale.len() - 1];

    if value.is_nan() {
        return color_for((first_value + last_value) * 0.5, mode);
    }
    if value <= first_value {
        return first_color;
    }
    if value >= last_value {
        return last_color;
    }

    for pair in scale.windows(2) {
        if let [(low, low_color), (high, high_color)] = pair
            && value <= *high
        {
            return lerp_color(*low_color, *high_color, (value - low) / (high - low));
        }
    }

    last_color
}

pub fn gradient_stops(mode: ColorMode) -> Vec<(f32, Color32)> {
    let scale = mode.scale();
    let first = scale[0].0;
    let span = scale[scale.len() - 1].0 - first;
    scale
        .iter()
        .map(|&(value, color)| ((value - first) / span, color))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{
        ColorMode, NEGATIVE_RED, NEUTRAL_GRAY, POSITIVE_GREEN, SUBJECTIVE_BLUE, color_for,
        gradient_stops,
    };

    #[test]
    fn sentiment_endpoints_and_midpoint() {
        assert_eq!(color_for(-1.0, ColorMode::Sentiment), NEGATIVE_RED);
        assert_eq!(color_for(0.0, ColorMode::Sentiment), NEUTRAL_GRAY);
        assert_eq!(color_for(1.0, ColorMode::Sentiment), POSITIVE_GREEN);
    }

    #[test]
    fn sentiment_gets_less_red_as_it_rises() {
        let samples = [-1.0, -0.5, 0.0, 0.5, 1.0].map(|value| color_for(value, ColorMode::Sentiment));
        for pair in samples.windows(2) {
            let redness = |color: eframe::egui::Color32| color.r() as i32 - color.g() as i32;
            assert!(pair[0].r() >= pair[1].r());
            assert!(redness(pair[0]) > redness(pair[1]));
        }
    }

    #[test]
    fn sentiment_uses_two_segments() {
        let halfway_negative = color_for(-0.5, ColorMode::Sentiment);
        assert_eq!(halfway_negative.r(), 246);
        assert_eq!(halfway_negative.g(), 118);
        assert_eq!(halfway_negative.b(), 118);
    }

    #[test]
    fn out_of_domain_values_clamp() {
        assert_eq!(color_for(-3.0, ColorMode::Sentiment), NEGATIVE_RED);
        assert_eq!(color_for(7.5, ColorMode::Sentiment), POSITIVE_GREEN);
        assert_eq!(color_for(-0.2, ColorMode::Subjectivity), NEUTRAL_GRAY);
        assert_eq!(color_for(1.2, ColorMode::Subjectivity), SUBJECTIVE_BLUE);
    }

    #[test]
    fn nan_maps_to_midpoint() {
        assert_eq!(color_for(f32::NAN, ColorMode::Sentiment), NEUTRAL_GRAY);
    }

    #[test]
    fn gradient_stops_cover_unit_interval() {
        let sentiment = gradient_stops(ColorMode::Sentiment);
        assert_eq!(
            sentiment,
            vec![(0.0, NEGATIVE_RED), (0.5, NEUTRAL_GRAY), (1.0, POSITIVE_GREEN)]
        );

        let subjectivity = gradient_stops(ColorMode::Subjectivity);
        assert_eq!(subjectivity, vec![(0.0, NEUTRAL_GRAY), (1.0, SUBJECTIVE_BLUE)]);
    }

    #[test]
    fn legend_labels_per_mode() {
        assert_eq!(
            ColorMode::Sentiment.legend_labels(),
            ("Negative", "Positive")
        );
        assert_eq!(
            ColorMode::Subjectivity.legend_labels(),
            ("Objective", "Subjective")
        );
    }
}
