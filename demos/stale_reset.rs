use {
    resetlog::{IntervalUnit, LoggerBuilder},
    std::{fs, time::Duration},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all("./logs")?;
    let path = "./logs/hourly.log";

    // Simulate a log file written two hours ago.
    fs::write(path, "old diagnostic output\n")?;
    let file = fs::OpenOptions::new().write(true).open(path)?;
    file.set_modified(std::time::SystemTime::now() - Duration::from_secs(2 * 60 * 60))?;
    drop(file);

    // Building with a one-hour interval finds the file past its threshold
    // and discards it before any appends happen.
    let logger = LoggerBuilder::new(path, chrono_tz::Europe::Paris)
        .interval_unit(IntervalUnit::Hours)
        .reset_interval(1)
        .build()?;

    println!("stale file removed: {}", !std::path::Path::new(path).exists());

    logger.log("stale_reset.rs", "info", "first entry of the new file")?;
    print!("{}", fs::read_to_string(path)?);

    Ok(())
}
