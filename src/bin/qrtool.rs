use clap::{Parser, Subcommand};
use screen_qr::config::{AppConfig, Hotkey, default_config_path};
use screen_qr::export::{ExportFormat, default_export_path, export_raster, save_raster};
use screen_qr::tools::{
    ReadingRate, bench_limit_from_env, dataset_iter, dataset_root_from_env, grayscale_stats,
    load_pixel_buffer, smoke_from_env,
};
use screen_qr::utils::grayscale::rgb_to_grayscale;
use screen_qr::{
    DecodeOutcome, ECLevel, ModuleScale, RenderOptions, ScanReport, decode_buffer, generate,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "qrtool", version, about = "screen_qr CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode the QR code in an image file
    Decode {
        #[arg(long)]
        image: PathBuf,
        /// Copy the decoded text to the system clipboard
        #[arg(long)]
        copy: bool,
    },
    /// Encode text and write the rendered symbol
    Encode {
        #[arg(long)]
        text: String,
        /// Error correction level: L, M, Q or H
        #[arg(long, default_value = "M")]
        level: ECLevel,
        /// Pixels per module: 4, 8, 12 or 16
        #[arg(long, default_value_t = 8)]
        scale: u32,
        /// Output file (.png, .jpg or .jpeg); a timestamped PNG here if omitted
        #[arg(long)]
        out: Option<PathBuf>,
        /// Also write the fixed-size preview here
        #[arg(long)]
        preview: Option<PathBuf>,
        /// Copy the export raster to the system clipboard
        #[arg(long)]
        copy: bool,
    },
    /// Decode every image below a directory and report the reading rate
    Batch {
        #[arg(long)]
        root: Option<PathBuf>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        smoke: bool,
    },
    /// Capture a region of the primary monitor and decode it
    #[cfg(feature = "screen")]
    Scan {
        /// Region as left,top,right,bottom; the whole monitor if omitted
        #[arg(long)]
        rect: Option<String>,
        /// Leave the clipboard alone instead of copying the decoded text
        #[arg(long)]
        no_copy: bool,
    },
    /// Show or edit the settings file
    Config {
        #[arg(long)]
        path: Option<PathBuf>,
        /// New scan hotkey, e.g. "Ctrl+Alt+Q"
        #[arg(long)]
        scan: Option<Hotkey>,
        /// New generate hotkey, e.g. "Ctrl+Q"
        #[arg(long)]
        generate: Option<Hotkey>,
        /// Enable or disable the generate hotkey
        #[arg(long)]
        generate_enabled: Option<bool>,
        /// Start with the user session
        #[arg(long)]
        autostart: Option<bool>,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Decode { image, copy } => decode_cmd(&image, copy),
        Command::Encode {
            text,
            level,
            scale,
            out,
            preview,
            copy,
        } => encode_cmd(&text, level, scale, out, preview.as_deref(), copy),
        Command::Batch { root, limit, smoke } => batch_cmd(root, limit, smoke),
        #[cfg(feature = "screen")]
        Command::Scan { rect, no_copy } => scan_cmd(rect.as_deref(), !no_copy),
        Command::Config {
            path,
            scan,
            generate,
            generate_enabled,
            autostart,
        } => {
            let edits = ConfigEdits {
                scan,
                generate,
                generate_enabled,
                autostart,
            };
            config_cmd(path, edits)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{}", message);
            ExitCode::FAILURE
        }
    }
}

fn decode_cmd(image: &Path, copy: bool) -> Result<(), String> {
    let buffer = load_pixel_buffer(image).map_err(|e| format!("{}: {}", image.display(), e))?;
    println!(
        "Image: {} ({}x{}, stride {})",
        image.display(),
        buffer.width(),
        buffer.height(),
        buffer.stride()
    );
    let stats = grayscale_stats(&rgb_to_grayscale(&buffer));
    log::debug!("Grayscale range: {}-{}, average: {}", stats.min, stats.max, stats.avg);

    let start = Instant::now();
    let outcome = decode_buffer(&buffer);
    log::info!("Decode took {:.2?}", start.elapsed());
    let report = ScanReport::from_result(outcome.into_result().map(Some));
    match &report {
        ScanReport::Decoded(text) => println!("{}", text),
        other => return Err(other.message().unwrap_or_default().to_string()),
    }
    if copy {
        copy_report(&report)?;
        println!("Copied to clipboard");
    }
    Ok(())
}

fn encode_cmd(
    text: &str,
    level: ECLevel,
    scale: u32,
    out: Option<PathBuf>,
    preview: Option<&Path>,
    copy: bool,
) -> Result<(), String> {
    let scale = ModuleScale::try_from(scale).map_err(|e| e.to_string())?;
    let symbol =
        generate(text, level, RenderOptions::with_scale(scale)).map_err(|e| e.to_string())?;

    let out = match out {
        Some(path) => {
            save_raster(&symbol.export, &path).map_err(|e| e.to_string())?;
            path
        }
        None => {
            let path = default_export_path(Path::new("."), ExportFormat::Png);
            export_raster(&symbol.export, &path, ExportFormat::Png).map_err(|e| e.to_string())?;
            path
        }
    };
    println!(
        "Wrote {} ({} modules, level {}, {}x{} px)",
        out.display(),
        symbol.matrix.size(),
        symbol.level.letter(),
        symbol.export.width(),
        symbol.export.height()
    );

    if let Some(path) = preview {
        save_raster(&symbol.preview, path).map_err(|e| e.to_string())?;
        println!("Wrote preview {}", path.display());
    }

    if copy {
        copy_to_clipboard(&symbol.export)?;
        println!("Copied to clipboard");
    }
    Ok(())
}

#[cfg(feature = "clipboard")]
fn copy_to_clipboard(raster: &image::RgbImage) -> Result<(), String> {
    use screen_qr::export::{ClipboardSink, SystemClipboard};

    let mut clipboard = SystemClipboard::new().map_err(|e| e.to_string())?;
    clipboard.set_image(raster).map_err(|e| e.to_string())
}

#[cfg(not(feature = "clipboard"))]
fn copy_to_clipboard(_raster: &image::RgbImage) -> Result<(), String> {
    Err(NO_CLIPBOARD.to_string())
}

#[cfg(feature = "clipboard")]
fn copy_report(report: &ScanReport) -> Result<bool, String> {
    use screen_qr::export::SystemClipboard;

    let mut clipboard = SystemClipboard::new().map_err(|e| e.to_string())?;
    report.copy_decoded(&mut clipboard).map_err(|e| e.to_string())
}

#[cfg(not(feature = "clipboard"))]
fn copy_report(_report: &ScanReport) -> Result<bool, String> {
    Err(NO_CLIPBOARD.to_string())
}

#[cfg(not(feature = "clipboard"))]
const NO_CLIPBOARD: &str = "qrtool was built without the clipboard feature";

fn batch_cmd(root: Option<PathBuf>, limit: Option<usize>, smoke: bool) -> Result<(), String> {
    let root = root.unwrap_or_else(dataset_root_from_env);
    let limit = limit.or_else(bench_limit_from_env);
    let smoke = smoke || smoke_from_env();

    if !root.exists() {
        return Err(format!("Dataset root not found: {}", root.display()));
    }

    let mut rate = ReadingRate::default();
    let mut total_elapsed = std::time::Duration::default();
    for path in dataset_iter(&root, limit, smoke) {
        rate.attempted += 1;
        let buffer = match load_pixel_buffer(&path) {
            Ok(buffer) => buffer,
            Err(err) => {
                rate.unreadable += 1;
                println!("  [{}] {} -> load_failed ({})", rate.attempted, path.display(), err);
                continue;
            }
        };

        let start = Instant::now();
        let outcome = decode_buffer(&buffer);
        let elapsed = start.elapsed();
        total_elapsed += elapsed;

        let verdict = match &outcome {
            DecodeOutcome::Found(text) => {
                rate.decoded += 1;
                format!("hit {:?}", text)
            }
            DecodeOutcome::NotFound => "miss".to_string(),
            DecodeOutcome::LibraryError(detail) => format!("error {}", detail),
        };
        println!("  [{}] {} -> {} ({:.2?})", rate.attempted, path.display(), verdict, elapsed);
    }

    if rate.attempted == 0 {
        println!("No images found under {}", root.display());
        return Ok(());
    }
    println!(
        "Reading rate: {}/{} = {:.2}% ({} unreadable, total {:.2?})",
        rate.decoded,
        rate.attempted,
        rate.percent(),
        rate.unreadable,
        total_elapsed
    );
    Ok(())
}

#[cfg(feature = "screen")]
fn parse_rect(text: &str) -> Result<screen_qr::Rect, String> {
    let values: Vec<i32> = text
        .split(',')
        .map(|v| v.trim().parse::<i32>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid rectangle '{}': {}", text, e))?;
    match values[..] {
        [left, top, right, bottom] => Ok(screen_qr::Rect::new(left, top, right, bottom)),
        _ => Err(format!("expected left,top,right,bottom, got '{}'", text)),
    }
}

#[cfg(feature = "screen")]
fn scan_cmd(rect: Option<&str>, copy: bool) -> Result<(), String> {
    use screen_qr::capture::{PrimaryMonitor, ScreenSource};
    use screen_qr::instance::{APP_LOCK_NAME, InstanceGuard};
    use screen_qr::{ScanCoordinator, ScanPipeline};

    let _instance = InstanceGuard::acquire(APP_LOCK_NAME).map_err(|e| e.to_string())?;
    let rect = rect.map(parse_rect).transpose()?;
    if let Some(rect) = rect.filter(|r| r.is_degenerate()) {
        return Err(format!("Selection {} is too small", rect.size_label()));
    }

    let mut coordinator = ScanCoordinator::new();
    let receiver = coordinator
        .trigger(move || {
            let screen = PrimaryMonitor::open()?;
            let rect = match rect {
                Some(rect) => rect,
                None => screen.bounds()?,
            };
            ScanPipeline::new(screen).scan_region(rect).map(Some)
        })
        .ok_or_else(|| "A scan is already in progress".to_string())?;
    let report = receiver
        .recv()
        .map_err(|_| "Scan worker exited without a result".to_string())?;
    coordinator.join();

    match &report {
        ScanReport::Decoded(text) => println!("{}", text),
        ScanReport::Cancelled => return Ok(()),
        ScanReport::Failed(message) => return Err(message.clone()),
    }
    if copy {
        match copy_report(&report) {
            Ok(_) => println!("Copied to clipboard"),
            Err(message) => log::warn!("Decoded text not copied: {}", message),
        }
    }
    Ok(())
}

struct ConfigEdits {
    scan: Option<Hotkey>,
    generate: Option<Hotkey>,
    generate_enabled: Option<bool>,
    autostart: Option<bool>,
}

impl ConfigEdits {
    fn is_empty(&self) -> bool {
        self.scan.is_none()
            && self.generate.is_none()
            && self.generate_enabled.is_none()
            && self.autostart.is_none()
    }
}

fn config_cmd(path: Option<PathBuf>, edits: ConfigEdits) -> Result<(), String> {
    let path = path.unwrap_or_else(default_config_path);
    let mut config = AppConfig::load_or_default(&path);

    if !edits.is_empty() {
        if let Some(hotkey) = edits.scan {
            config.scan_hotkey = hotkey;
        }
        if let Some(hotkey) = edits.generate {
            config.generate_hotkey = hotkey;
        }
        if let Some(enabled) = edits.generate_enabled {
            config.generate_enabled = enabled;
        }
        if let Some(autostart) = edits.autostart {
            config.autostart = autostart;
        }
        config.validate().map_err(|e| e.to_string())?;
        config.save(&path).map_err(|e| e.to_string())?;
        println!("Saved {}", path.display());
    }

    println!("Settings: {}", path.display());
    println!("  Scan hotkey:     {}", config.scan_hotkey);
    println!(
        "  Generate hotkey: {} ({})",
        config.generate_hotkey,
        if config.generate_enabled { "enabled" } else { "disabled" }
    );
    println!("  Autostart:       {}", if config.autostart { "on" } else { "off" });
    Ok(())
}
