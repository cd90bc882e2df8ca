use resetlog::{IntervalUnit, LoggerBuilder};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // The logger appends into an existing directory; it never creates one.
    std::fs::create_dir_all("./logs")?;

    let logger = LoggerBuilder::new("./logs/app.log", chrono_tz::Europe::Paris)
        .interval_unit(IntervalUnit::Days)
        .reset_interval(1) // Start from a blank file once it is a day old
        .build()?;

    logger.log("main.rs", "info", "This is an info message")?;
    logger.log("main.rs", "warn", "This is a warning message")?;
    logger.log("main.rs", "error", "This is an error message")?;

    Ok(())
}
