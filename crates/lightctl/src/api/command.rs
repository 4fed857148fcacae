use std::fmt;

/// Highest hue the server accepts, in degrees.
pub const MAX_HUE: u16 = 360;

/// Highest saturation or brightness value, in percent.
pub const MAX_PERCENT: u8 = 100;

/// A color for `set_hsv`.
///
/// The server routes a transition only together with a brightness value, so
/// the constructor refuses a transition on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsv {
    hue: u16,
    saturation: u8,
    value: Option<u8>,
    transition_ms: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HsvError {
    #[error("hue {0} is out of range (0-360)")]
    Hue(u16),

    #[error("{0} {1} is out of range (0-100)")]
    Percent(&'static str, u8),

    #[error("a transition needs a brightness value")]
    TransitionWithoutValue,
}

impl Hsv {
    pub fn new(
        hue: u16,
        saturation: u8,
        value: Option<u8>,
        transition_ms: Option<u32>,
    ) -> Result<Self, HsvError> {
        if hue > MAX_HUE {
            return Err(HsvError::Hue(hue));
        }
        if saturation > MAX_PERCENT {
            return Err(HsvError::Percent("saturation", saturation));
        }
        if let Some(value) = value.filter(|v| *v > MAX_PERCENT) {
            return Err(HsvError::Percent("value", value));
        }
        if transition_ms.is_some() && value.is_none() {
            return Err(HsvError::TransitionWithoutValue);
        }

        Ok(Self {
            hue,
            saturation,
            value,
            transition_ms,
        })
    }

    pub fn hue(&self) -> u16 {
        self.hue
    }

    pub fn saturation(&self) -> u8 {
        self.saturation
    }

    pub fn value(&self) -> Option<u8> {
        self.value
    }

    pub fn transition_ms(&self) -> Option<u32> {
        self.transition_ms
    }
}

/// A device action understood by the lighting server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Open a server-side session with the device
    Connect,
    On,
    Off,
    SetHsv(Hsv),
    /// Cycle through random colors every `interval_ms`
    StartRandom { interval_ms: u32 },
    StopRandom,
}

impl Command {
    /// Request path for this command against `address`
    pub fn path(&self, address: &str) -> String {
        match self {
            Command::Connect => format!("{}/new", address),
            Command::On => format!("{}/on", address),
            Command::Off => format!("{}/off", address),
            Command::SetHsv(hsv) => {
                let mut path = format!("{}/set_hsv/{}/{}", address, hsv.hue, hsv.saturation);
                if let Some(value) = hsv.value {
                    path.push_str(&format!("/{}", value));
                    if let Some(transition) = hsv.transition_ms {
                        path.push_str(&format!("/{}", transition));
                    }
                }
                path
            }
            Command::StartRandom { interval_ms } => {
                format!("{}/start_random/{}", address, interval_ms)
            }
            Command::StopRandom => format!("{}/stop_random", address),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Connect => write!(f, "connect"),
            Command::On => write!(f, "on"),
            Command::Off => write!(f, "off"),
            Command::SetHsv(hsv) => write!(f, "set_hsv({}, {})", hsv.hue, hsv.saturation),
            Command::StartRandom { interval_ms } => write!(f, "start_random({}ms)", interval_ms),
            Command::StopRandom => write!(f, "stop_random"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_paths() {
        assert_eq!(Command::Connect.path("10.0.0.5"), "10.0.0.5/new");
        assert_eq!(Command::On.path("10.0.0.5"), "10.0.0.5/on");
        assert_eq!(Command::Off.path("10.0.0.5"), "10.0.0.5/off");
    }

    #[test]
    fn test_set_hsv_paths() {
        let color = Hsv::new(240, 100, None, None).unwrap();
        assert_eq!(
            Command::SetHsv(color).path("10.0.0.5"),
            "10.0.0.5/set_hsv/240/100"
        );

        let dimmed = Hsv::new(120, 50, Some(30), None).unwrap();
        assert_eq!(
            Command::SetHsv(dimmed).path("10.0.0.5"),
            "10.0.0.5/set_hsv/120/50/30"
        );

        let faded = Hsv::new(0, 100, Some(20), Some(1000)).unwrap();
        assert_eq!(
            Command::SetHsv(faded).path("10.0.0.5"),
            "10.0.0.5/set_hsv/0/100/20/1000"
        );
    }

    #[test]
    fn test_random_paths() {
        assert_eq!(
            Command::StartRandom { interval_ms: 500 }.path("10.0.0.5"),
            "10.0.0.5/start_random/500"
        );
        assert_eq!(Command::StopRandom.path("10.0.0.5"), "10.0.0.5/stop_random");
    }

    #[test]
    fn test_hsv_validation() {
        assert_eq!(Hsv::new(361, 0, None, None), Err(HsvError::Hue(361)));
        assert_eq!(
            Hsv::new(0, 101, None, None),
            Err(HsvError::Percent("saturation", 101))
        );
        assert_eq!(
            Hsv::new(0, 0, Some(150), None),
            Err(HsvError::Percent("value", 150))
        );
        assert_eq!(
            Hsv::new(0, 0, None, Some(100)),
            Err(HsvError::TransitionWithoutValue)
        );
        assert!(Hsv::new(MAX_HUE, MAX_PERCENT, Some(MAX_PERCENT), Some(0)).is_ok());
    }
}
