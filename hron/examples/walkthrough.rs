//! Parse a schedule, list upcoming and past runs, and check instants.
//!
//! cargo run -p hron --example walkthrough

use hron::Schedule;
use jiff::Zoned;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let schedule: Schedule = "every weekday at 9:00, 17:30 in Europe/Berlin".parse()?;
    println!("schedule: {schedule}");

    let now: Zoned = "2026-03-27T12:00:00+01:00[Europe/Berlin]".parse()?;
    println!("\nnext five after {now}:");
    for hit in schedule.next_n_from(&now, 5) {
        println!("  {hit}");
    }

    if let Some(prev) = schedule.previous_from(&now) {
        println!("\nprevious: {prev}");
    }

    let monday: Zoned = "2026-03-30T09:00:00+02:00[Europe/Berlin]".parse()?;
    let sunday: Zoned = "2026-03-29T09:00:00+02:00[Europe/Berlin]".parse()?;
    println!("\n{monday} matches: {}", schedule.matches(&monday));
    println!("{sunday} matches: {}", schedule.matches(&sunday));

    let until: Zoned = "2026-04-30T23:59:00+02:00[Europe/Berlin]".parse()?;
    println!(
        "\nruns before the end of april: {}",
        schedule.between(&now, &until).count()
    );

    if let Err(err) = Schedule::parse("every weekday 09:00") {
        println!("\n{}", err.display_rich());
    }
    Ok(())
}
