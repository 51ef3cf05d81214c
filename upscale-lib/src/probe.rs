use crate::*;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameRate {
    pub num: u32,
    pub den: u32,
}

impl FrameRate {
    pub fn as_f64(self) -> f64 {
        self.num as f64 / self.den as f64
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub frame_rate: FrameRate,
}

/// Parses ffprobe's `csv=s=x:p=0` output, e.g. `1920x1080x24000/1001`. Only
/// the first line is looked at.
impl FromStr for VideoMetadata {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || Error::MalformedProbe(s.to_owned());

        let line = s.lines().next().unwrap_or_default().trim();
        let parts: Vec<_> = line.split('x').collect();

        let [width, height, rate] = parts[..] else {
            return Err(malformed());
        };

        let (num, den) = rate.split_once('/').ok_or_else(malformed)?;

        let width = width.parse().map_err(|_| malformed())?;
        let height = height.parse().map_err(|_| malformed())?;
        let num = num.parse().map_err(|_| malformed())?;
        let den: u32 = den.parse().map_err(|_| malformed())?;

        if den == 0 {
            return Err(malformed());
        }

        Ok(Self {
            width,
            height,
            frame_rate: FrameRate { num, den },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ntsc_film_rate() {
        let meta: VideoMetadata = "1920x1080x24000/1001".parse().unwrap();

        assert_eq!(meta.width, 1920);
        assert_eq!(meta.height, 1080);
        assert_eq!(meta.frame_rate, FrameRate { num: 24000, den: 1001 });
        assert!((meta.frame_rate.as_f64() - 23.976).abs() < 0.001);
        assert_eq!(meta.frame_rate.to_string(), "24000/1001");
    }

    #[test]
    fn only_the_first_line_counts() {
        let meta: VideoMetadata = "640x480x1199/50\n\n320x240x30/1\n".parse().unwrap();

        assert_eq!(meta.frame_rate, FrameRate { num: 1199, den: 50 });
    }

    #[test]
    fn rejects_malformed_output() {
        for input in [
            "",
            "1920x1080",
            "1920x1080x24000",
            "1920x1080x24000/1001x5",
            "widthx1080x24/1",
            "1920x1080x24/0",
            "1920x1080x0/0",
        ] {
            let err = input.parse::<VideoMetadata>().unwrap_err();

            assert!(matches!(err, Error::MalformedProbe(_)), "{:?}", input);
        }
    }
}
