// CLI command implementations
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chunkscope::{FileSource, LogSink, ReadOptions};

use super::config::{Commands, Config};
use super::output::OutputFormatter;
use super::{CliError, CliResult};

/// Run the selected subcommand
pub fn run(config: &Config) -> CliResult<()> {
    let formatter = OutputFormatter::new(config.format, config.quiet);

    match &config.command {
        Commands::Read {
            files,
            output,
            min_size,
            no_tag,
        } => {
            let options = ReadOptions {
                min_file_size: *min_size,
                read_tag: !no_tag,
            };
            command_read(files, output.as_deref(), &options, &formatter)
        }
        Commands::Chunks { files } => command_chunks(files, &formatter),
        Commands::Detect { files } => command_detect(files, &formatter),
        Commands::Batch { directory, pattern } => command_batch(directory, pattern, &formatter),
        Commands::Info { files, detailed } => command_info(files, *detailed, &formatter),
    }
}

fn require_files(files: &[String]) -> CliResult<()> {
    if files.is_empty() {
        return Err(CliError::Other("No files specified".to_string()));
    }
    Ok(())
}

/// Read header and tag information from files
fn command_read(
    files: &[String],
    output: Option<&str>,
    options: &ReadOptions,
    formatter: &OutputFormatter,
) -> CliResult<()> {
    require_files(files)?;

    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout()),
    };

    let mut failed = 0;
    for file_path in files {
        if !Path::new(file_path).exists() {
            formatter.print_error(&CliError::FileNotFound(file_path.clone()).to_string());
            failed += 1;
            continue;
        }

        match chunkscope::read_path(file_path, options) {
            Ok(info) => {
                let mut value = serde_json::to_value(&info)?;
                if let Some(obj) = value.as_object_mut() {
                    obj.insert("file".to_string(), serde_json::Value::String(file_path.clone()));
                }
                formatter.output_value(&value, &mut *writer)?;
            }
            Err(e) => {
                formatter.print_error(&format!("{}: {}", file_path, CliError::from(e)));
                failed += 1;
            }
        }
    }
    writer.flush()?;

    if failed > 0 {
        return Err(CliError::Other(format!("{} of {} files failed", failed, files.len())));
    }
    Ok(())
}

/// List the chunk summaries of each file
fn command_chunks(files: &[String], formatter: &OutputFormatter) -> CliResult<()> {
    require_files(files)?;

    let options = ReadOptions::default();
    for file_path in files {
        let info = chunkscope::read_path(file_path, &options)?;
        println!("{}", file_path);
        for summary in &info.tag.chunk_summaries {
            println!(
                "  {:>10}  {:<40} header {:>2}  size {}",
                summary.offset,
                summary.id.to_string(),
                summary.header_size,
                summary.size
            );
        }
        if info.tag.incorrectly_aligned_tag {
            formatter.print_info("tag chunk found at a misaligned offset");
        }
    }
    Ok(())
}

/// Detect container format
fn command_detect(files: &[String], formatter: &OutputFormatter) -> CliResult<()> {
    require_files(files)?;

    for file_path in files {
        let detected = FileSource::open(file_path).and_then(|mut source| chunkscope::detect_format(&mut source));
        match detected {
            Ok(Some(format)) => println!("{}: {}", file_path, format),
            Ok(None) => formatter.print_error(&format!("{}: Unknown format", file_path)),
            Err(e) => formatter.print_error(&format!("{}: {}", file_path, e)),
        }
    }
    Ok(())
}

/// Read every matching file in a directory
fn command_batch(directory: &str, pattern: &str, formatter: &OutputFormatter) -> CliResult<()> {
    use glob::glob;

    let glob_pattern = if pattern.contains('*') || pattern.contains('?') {
        format!("{}/{}", directory, pattern)
    } else {
        format!("{}/**/{}", directory, pattern)
    };

    let mut files = Vec::new();
    for entry in glob(&glob_pattern).map_err(|e| CliError::Other(format!("Invalid glob pattern: {}", e)))? {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => formatter.print_error(&format!("Error reading path: {}", e)),
        }
    }

    if files.is_empty() {
        formatter.print_info("No files found matching pattern");
        return Ok(());
    }
    formatter.print_info(&format!("Processing {} files...", files.len()));

    let options = ReadOptions::default();
    let mut success_count = 0;
    let mut error_count = 0;
    for path in &files {
        let mut source = match FileSource::open(path) {
            Ok(source) => source,
            Err(e) => {
                formatter.print_error(&format!("{}: {}", path.display(), e));
                error_count += 1;
                continue;
            }
        };
        match chunkscope::read_with(&mut source, &options, &mut LogSink) {
            Ok(info) => {
                let kbps = info.header.bit_rate.map_or("?".to_string(), |r| r.to_string());
                formatter.print_success(&format!("{} ({} kbps)", path.display(), kbps));
                success_count += 1;
            }
            Err(e) => {
                formatter.print_error(&format!("{}: {}", path.display(), e));
                error_count += 1;
            }
        }
    }

    formatter.print_info(&format!("Completed: {} successful, {} errors", success_count, error_count));
    Ok(())
}

/// Show file system and encoding information
fn command_info(files: &[String], detailed: bool, formatter: &OutputFormatter) -> CliResult<()> {
    require_files(files)?;

    for file_path in files {
        let path = Path::new(file_path);
        if !path.exists() {
            formatter.print_error(&CliError::FileNotFound(file_path.clone()).to_string());
            continue;
        }

        let metadata = std::fs::metadata(path)?;
        let modified = metadata
            .modified()
            .ok()
            .map(chrono::DateTime::<chrono::Utc>::from);

        let info = chunkscope::read_path(path, &ReadOptions::default());

        println!("\n{}", file_path);
        println!("{}", "─".repeat(60));
        println!("Size: {} bytes", metadata.len());
        if let Some(date) = modified {
            println!("Modified: {}", date.format("%Y-%m-%d %H:%M:%S UTC"));
        }

        let info = match info {
            Ok(info) => info,
            Err(e) => {
                println!("Format: Unknown ({})", e);
                continue;
            }
        };
        let header = &info.header;
        println!(
            "Format: {}",
            header.format.map_or("Unknown".to_string(), |f| f.to_string())
        );
        if let Some(length) = header.precise_length {
            println!("Length: {:.3} s", length);
        }
        if let Some(rate) = header.bit_rate {
            println!("Bit rate: {} kbps{}", rate, if header.variable_bit_rate { " (VBR)" } else { "" });
        }

        if detailed {
            println!("\nDetailed Information:");
            if let Some(encoding) = &header.encoding_type {
                println!("Encoding: {}", encoding);
            }
            if let Some(rate) = header.sample_rate {
                println!("Sample rate: {} Hz", rate);
            }
            if let Some(channels) = header.channels {
                println!("Channels: {}", channels);
            }
            if let Some(bits) = header.bits_per_sample {
                println!("Bits per sample: {}", bits);
            }
            if let (Some(start), Some(length)) = (header.audio_data_start, header.audio_data_length) {
                println!("Audio data: {} bytes at offset {}", length, start);
            }
            println!("Chunks: {}", info.tag.chunk_summaries.len());
            println!("Tag blocks: {}", info.tag.contributions.len());
        }
    }

    Ok(())
}
