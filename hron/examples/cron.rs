//! Converting between hron and cron.
//!
//! cargo run -p hron --example cron

use hron::cron::explain_cron;
use hron::Schedule;

fn main() {
    for expr in [
        "every day at 09:00",
        "every weekday at 08:30",
        "every 15 min from 00:00 to 23:59",
        "every month on the nearest weekday to 15th at 12:00",
        "every 2 weeks on mon at 09:00",
        "last fri of every month at 17:00",
    ] {
        let converted = Schedule::parse(expr).and_then(|s| s.to_cron());
        match converted {
            Ok(cron) => println!("{expr:<55} -> {cron}"),
            Err(err) => println!("{expr:<55} -> {err}"),
        }
    }

    println!();
    for cron in ["0 9 * * 1-5", "*/20 9-17 * * *", "0 9 LW * *", "0 10 * * 1#2", "@hourly", "*/45 * * * *"] {
        match explain_cron(cron) {
            Ok(text) => println!("{cron:<18} -> {text}"),
            Err(err) => println!("{cron:<18} -> error: {err}"),
        }
    }
}
