//! Persistent settings.
//!
//! A flat `key=value` file with two sections, read once at startup and
//! rewritten in full on every change. Missing files, unknown keys and
//! malformed values fall back to the defaults.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{debug, info};

use crate::error::ConfigError;

/// Settings file name, placed next to the executable
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Environment variable overriding the settings file location
pub const CONFIG_PATH_ENV: &str = "SCREEN_QR_CONFIG";

/// Modifier bit for Alt
pub const MOD_ALT: u32 = 0x1;
/// Modifier bit for Ctrl
pub const MOD_CONTROL: u32 = 0x2;
/// Modifier bit for Shift
pub const MOD_SHIFT: u32 = 0x4;
/// Modifier bit for the Windows/Super key
pub const MOD_WIN: u32 = 0x8;

const VK_TAB: u32 = 0x09;
const VK_RETURN: u32 = 0x0D;
const VK_ESCAPE: u32 = 0x1B;
const VK_SPACE: u32 = 0x20;
const VK_F1: u32 = 0x70;
const VK_F12: u32 = 0x7B;

/// Modifier names in display order
const MODIFIER_NAMES: [(u32, &str); 4] = [
    (MOD_CONTROL, "Ctrl"),
    (MOD_ALT, "Alt"),
    (MOD_SHIFT, "Shift"),
    (MOD_WIN, "Win"),
];

fn is_alphanumeric_key(key: u32) -> bool {
    char::from_u32(key).is_some_and(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// A global hotkey: modifier bits plus a virtual key code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hotkey {
    /// OR of the `MOD_*` bits
    pub modifiers: u32,
    /// Virtual key code
    pub key: u32,
}

impl Hotkey {
    /// Create a hotkey
    pub const fn new(modifiers: u32, key: u32) -> Self {
        Self { modifiers, key }
    }

    /// Default scan hotkey, Ctrl + Alt + Q
    pub const SCAN_DEFAULT: Hotkey = Hotkey::new(MOD_CONTROL | MOD_ALT, 'Q' as u32);

    /// Default generate hotkey, Ctrl + Q
    pub const GENERATE_DEFAULT: Hotkey = Hotkey::new(MOD_CONTROL, 'Q' as u32);

    /// Display name of a key code
    pub fn key_name(key: u32) -> String {
        match key {
            VK_F1..=VK_F12 => format!("F{}", key - VK_F1 + 1),
            k if is_alphanumeric_key(k) => char::from_u32(k).map(String::from).unwrap_or_default(),
            VK_SPACE => "Space".to_string(),
            VK_RETURN => "Enter".to_string(),
            VK_TAB => "Tab".to_string(),
            VK_ESCAPE => "Esc".to_string(),
            _ => "Unknown".to_string(),
        }
    }

    fn key_code(name: &str) -> Option<u32> {
        let upper = name.trim().to_ascii_uppercase();
        match upper.as_str() {
            "SPACE" => Some(VK_SPACE),
            "ENTER" | "RETURN" => Some(VK_RETURN),
            "TAB" => Some(VK_TAB),
            "ESC" | "ESCAPE" => Some(VK_ESCAPE),
            s if s.len() == 1 => {
                let c = s.chars().next()?;
                c.is_ascii_alphanumeric().then_some(c as u32)
            }
            s => {
                let n: u32 = s.strip_prefix('F')?.parse().ok()?;
                (1..=12).contains(&n).then_some(VK_F1 + n - 1)
            }
        }
    }

    /// "Ctrl + Alt + Q" style label
    pub fn label(&self) -> String {
        let mut parts: Vec<String> = MODIFIER_NAMES
            .iter()
            .filter(|(bit, _)| self.modifiers & bit != 0)
            .map(|(_, name)| name.to_string())
            .collect();
        parts.push(Self::key_name(self.key));
        parts.join(" + ")
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for Hotkey {
    type Err = String;

    /// Parse "Ctrl+Alt+Q" (spaces and case are ignored)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut modifiers = 0;
        let mut key = None;
        for part in s.split('+').map(str::trim).filter(|p| !p.is_empty()) {
            let modifier = match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => Some(MOD_CONTROL),
                "alt" => Some(MOD_ALT),
                "shift" => Some(MOD_SHIFT),
                "win" | "super" | "meta" => Some(MOD_WIN),
                _ => None,
            };
            match (modifier, key) {
                (Some(bit), _) => modifiers |= bit,
                (None, None) => {
                    let code = Self::key_code(part)
                        .ok_or_else(|| format!("unknown key '{}'", part))?;
                    key = Some(code);
                }
                (None, Some(_)) => return Err(format!("more than one key in '{}'", s)),
            }
        }
        let key = key.ok_or_else(|| format!("no key in '{}'", s))?;
        if modifiers == 0 {
            return Err(format!("'{}' needs at least one modifier", s));
        }
        Ok(Self { modifiers, key })
    }
}

/// Everything persisted between runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppConfig {
    /// Hotkey that starts a scan
    pub scan_hotkey: Hotkey,
    /// Hotkey that opens the generator
    pub generate_hotkey: Hotkey,
    /// Whether the generate hotkey is registered at all
    pub generate_enabled: bool,
    /// Start with the user session
    pub autostart: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scan_hotkey: Hotkey::SCAN_DEFAULT,
            generate_hotkey: Hotkey::GENERATE_DEFAULT,
            generate_enabled: false,
            autostart: false,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.parse::<i64>().ok()? {
        0 => Some(false),
        _ => Some(true),
    }
}

impl AppConfig {
    /// Parse settings text; anything unusable keeps its default
    pub fn parse(text: &str) -> Self {
        let mut config = Self::default();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(['[', '#', ';']) {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            let applied = match key {
                "ScanModifiers" => value.parse().ok().map(|v| config.scan_hotkey.modifiers = v),
                "ScanKey" => value.parse().ok().map(|v| config.scan_hotkey.key = v),
                "GenerateModifiers" => value
                    .parse()
                    .ok()
                    .map(|v| config.generate_hotkey.modifiers = v),
                "GenerateKey" => value.parse().ok().map(|v| config.generate_hotkey.key = v),
                "GenerateEnabled" => parse_flag(value).map(|v| config.generate_enabled = v),
                "AutoStart" => parse_flag(value).map(|v| config.autostart = v),
                _ => Some(()),
            };
            if applied.is_none() {
                debug!("Ignoring malformed setting {}={}", key, value);
            }
        }
        config
    }

    /// Serialized form, written exactly as read
    pub fn to_ini_string(&self) -> String {
        format!(
            "[Hotkeys]\n\
             ScanModifiers={}\n\
             ScanKey={}\n\
             GenerateModifiers={}\n\
             GenerateKey={}\n\
             GenerateEnabled={}\n\
             \n\
             [Settings]\n\
             AutoStart={}\n",
            self.scan_hotkey.modifiers,
            self.scan_hotkey.key,
            self.generate_hotkey.modifiers,
            self.generate_hotkey.key,
            u8::from(self.generate_enabled),
            u8::from(self.autostart),
        )
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(Self::parse(&text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No settings at {}; using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Load, treating any read failure as "use defaults"
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            info!("{}; using defaults", e);
            Self::default()
        })
    }

    /// Write the whole file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        fs::write(path, self.to_ini_string())?;
        debug!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Reject an enabled generate hotkey that collides with the scan hotkey
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generate_enabled && self.generate_hotkey == self.scan_hotkey {
            return Err(ConfigError::HotkeyConflict(self.generate_hotkey.label()));
        }
        Ok(())
    }
}

/// Settings path: `$SCREEN_QR_CONFIG`, else `config.ini` beside the executable
pub fn default_config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(CONFIG_FILE_NAME)))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}
