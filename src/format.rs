use std::fmt::Display;

/// Formatting policy for numbers in the text outputs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FloatFormat {
    /// Shortest representation that parses back to the same value.
    #[default]
    Shortest,
    /// Fixed number of digits after the decimal point, like `%0.6f`.
    Fixed(usize),
}

impl FloatFormat {
    /// Formats a value. Negative zero is written as zero.
    pub fn format(&self, value: f64) -> String {
        let value = value + 0.0;
        self.format_value(value, value.is_finite())
    }

    /// Single precision variant of `format`.
    pub fn format_f32(&self, value: f32) -> String {
        let value = value + 0.0;
        self.format_value(value, value.is_finite())
    }

    fn format_value<F: ryu::Float + Display>(&self, value: F, finite: bool) -> String {
        match *self {
            FloatFormat::Shortest if !finite => value.to_string(),
            FloatFormat::Shortest => {
                let mut buffer = ryu::Buffer::new();
                let text = buffer.format_finite(value);
                text.strip_suffix(".0").unwrap_or(text).to_string()
            }
            FloatFormat::Fixed(digits) => format!("{value:.digits$}"),
        }
    }

    /// Formats values separated by single spaces.
    pub fn join(&self, values: &[f64]) -> String {
        values
            .iter()
            .map(|v| self.format(*v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortest() {
        let f = FloatFormat::Shortest;
        assert_eq!(f.format(0.0), "0");
        assert_eq!(f.format(-1.0), "-1");
        assert_eq!(f.format(0.1), "0.1");
        assert_eq!(f.format(1234.5678), "1234.5678");
        let third = 1.0 / 3.0;
        assert_eq!(f.format(third).parse::<f64>().unwrap(), third);
        assert_eq!(f.format_f32(0.1), "0.1");
        assert_eq!(f.format_f32(4464.0), "4464");
        assert_eq!(f.format_f32(-0.0), "0");
        assert_eq!(f.format_f32(f32::NAN), "NaN");
    }

    #[test]
    fn fixed() {
        let f = FloatFormat::Fixed(6);
        assert_eq!(f.format(0.0), "0.000000");
        assert_eq!(f.format(-319.5), "-319.500000");
        assert_eq!(f.format(-0.0), "0.000000");
        assert_eq!(FloatFormat::Shortest.format(-0.0), "0");
        assert_eq!(f.join(&[1.0, 2.25]), "1.000000 2.250000");
        assert_eq!(f.format_f32(-0.0), "0.000000");
        assert_eq!(f.format_f32(0.5), "0.500000");
    }
}
