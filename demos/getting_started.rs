//! Getting Started
//!
//! Indexes a few coffee shops, then runs a "near me" search that only uses
//! equality lookups on geobox keys.

use geobox::{
    Coordinate, DaySpan, Filters, GeoRecord, HalfHour, HasHours, MemoryStore, OpenAt,
    SearchOptions, Weekday, WeeklyHours, compute, compute_neighborhood, search_nearby,
};
use std::error::Error;

#[derive(Debug, Clone)]
struct Shop {
    name: &'static str,
    at: Coordinate,
    hours: WeeklyHours,
}

impl GeoRecord for Shop {
    type Id = &'static str;

    fn id(&self) -> &'static str {
        self.name
    }

    fn coordinate(&self) -> &Coordinate {
        &self.at
    }
}

impl HasHours for Shop {
    fn hours(&self) -> &WeeklyHours {
        &self.hours
    }
}

fn shop(
    name: &'static str,
    lat: &str,
    lon: &str,
    open: u8,
    close: u8,
) -> Result<Shop, Box<dyn Error>> {
    Ok(Shop {
        name,
        at: Coordinate::parse(lat, lon)?,
        hours: WeeklyHours::every_day(&[DaySpan::Hours { open, close }]),
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    println!("=== Geobox - Getting Started ===\n");

    // 1. Keys for a single point
    println!("1. Geobox keys");
    println!("--------------");
    let here = Coordinate::parse("37.78452", "-122.39532")?;
    println!("   Point:        {}", here);
    println!("   (6, 10):      {}", compute(&here, 6, 10)?);
    println!("   (4, 5):       {}", compute(&here, 4, 5)?);
    println!("   Neighborhood at (3, 2):");
    for key in compute_neighborhood(&here, 3, 2)? {
        println!("     {}", key);
    }

    // 2. Index records
    println!("\n2. Indexing");
    println!("-----------");
    let store = MemoryStore::new();
    store.put(shop("ritual", "37.78460", "-122.39540", 7, 19)?)?;
    store.put(shop("blue_bottle", "37.78220", "-122.40780", 6, 18)?)?;
    store.put(shop("sightglass", "37.77700", "-122.40850", 7, 20)?)?;
    store.put(shop("late_night", "37.78500", "-122.39600", 18, 24)?)?;
    let stats = store.stats();
    println!(
        "   {} records under {} distinct keys",
        stats.record_count, stats.key_count
    );

    // 3. Concentric search
    println!("\n3. Search");
    println!("---------");
    let options = SearchOptions::default().with_max_results(3);
    for hit in search_nearby(&store, &here, &options, &Filters::none())? {
        println!("   {:<12} {:>8.1} m", hit.record.name, hit.distance);
    }
    println!("   lookups issued: {}", store.stats().lookup_count);

    // 4. Extra filters travel with every lookup
    println!("\n4. Open on Monday at 08:00");
    println!("--------------------------");
    let morning = HalfHour::from_time(8, 0).ok_or("invalid time")?;
    let open = OpenAt::new(Weekday::Monday, morning);
    let filters = Filters::none().with(open.predicate::<Shop>());
    for hit in search_nearby(&store, &here, &options, &filters)? {
        println!("   {:<12} {:>8.1} m", hit.record.name, hit.distance);
    }

    Ok(())
}
