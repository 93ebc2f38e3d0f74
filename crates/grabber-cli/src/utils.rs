use std::{
    fmt::Display,
    sync::{LazyLock, PoisonError, RwLock},
    time::Duration,
};

use nu_ansi_term::Color;

pub static COLOR: LazyLock<RwLock<bool>> = LazyLock::new(|| RwLock::new(true));
pub static PROGRESS: LazyLock<RwLock<bool>> = LazyLock::new(|| RwLock::new(true));

pub fn set_color(enabled: bool) {
    *COLOR.write().unwrap_or_else(PoisonError::into_inner) = enabled;
}

pub fn set_progress(enabled: bool) {
    *PROGRESS.write().unwrap_or_else(PoisonError::into_inner) = enabled;
}

pub fn progress_enabled() -> bool {
    *PROGRESS.read().unwrap_or_else(PoisonError::into_inner)
}

pub struct Colored<T: Display>(pub Color, pub T);

impl<T: Display> Display for Colored<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let color = COLOR.read().unwrap_or_else(PoisonError::into_inner);
        if *color {
            write!(f, "{}", self.0.prefix())?;
            self.1.fmt(f)?;
            write!(f, "{}", self.0.suffix())
        } else {
            self.1.fmt(f)
        }
    }
}

/// Formats a byte count with binary units, e.g. `1.50 MiB`.
pub fn format_bytes(bytes: u64, precision: usize) -> String {
    let unit = 1024.0;
    let sizes = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];

    let idx = if bytes == 0 {
        0
    } else {
        ((bytes as f64).log(unit).floor() as usize).min(sizes.len() - 1)
    };

    format!(
        "{:.*} {}",
        precision,
        bytes as f64 / unit.powi(idx as i32),
        sizes[idx]
    )
}

pub fn format_duration(duration: Duration) -> String {
    format!("{duration:.2?}")
}

#[cfg(test)]
mod tests {
    use nu_ansi_term::Color::Green;
    use serial_test::serial;

    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0, 0), "0 B");
        assert_eq!(format_bytes(1023, 0), "1023 B");
        assert_eq!(format_bytes(1024, 2), "1.00 KiB");
        assert_eq!(format_bytes(1536 * 1024, 2), "1.50 MiB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
        assert_eq!(format_duration(Duration::from_millis(5)), "5.00ms");
    }

    #[test]
    #[serial]
    fn test_colored_respects_switch() {
        set_color(false);
        assert_eq!(Colored(Green, "ok").to_string(), "ok");

        set_color(true);
        let painted = Colored(Green, "ok").to_string();
        assert!(painted.contains("ok"));
        assert_ne!(painted, "ok");
    }
}
