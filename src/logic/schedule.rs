use crate::models::{ApplicationPlan, IrrigationEvent, IrrigationSystem, Location, Urgency};
use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};

/// Local solar hour preferred for non-urgent irrigation
const EARLY_MORNING_HOUR: i64 = 6;

/// Split a net dose into timed irrigation runs for the given system.
///
/// Critical stress gets one run within the hour, high stress is split 60/40
/// over two days, anything milder waits for an early-morning window.
pub fn plan_application(
    net_mm: f64,
    urgency: Urgency,
    system: IrrigationSystem,
    as_of: DateTime<Utc>,
    location: &Location,
) -> ApplicationPlan {
    let shares: Vec<(DateTime<Utc>, f64)> = match urgency {
        Urgency::Critical => vec![(as_of + Duration::hours(1), 1.0)],
        Urgency::High => vec![
            (as_of + Duration::hours(2), 0.6),
            (as_of + Duration::hours(24), 0.4),
        ],
        Urgency::Medium => vec![(early_morning(as_of, location, 1), 1.0)],
        Urgency::Low | Urgency::None => vec![(early_morning(as_of, location, 2), 1.0)],
    };

    let events: Vec<IrrigationEvent> = shares
        .into_iter()
        .map(|(start, share)| {
            let net = net_mm * share;
            let gross = net / system.efficiency();
            IrrigationEvent {
                start,
                net_mm: net,
                gross_mm: gross,
                duration_hours: gross / system.application_rate_mm_h(),
                cost_usd_per_ha: gross * system.cost_per_mm_ha(),
            }
        })
        .collect();

    let total_cost_usd_per_ha: f64 = events.iter().map(|e| e.cost_usd_per_ha).sum();
    let cost_per_mm_usd_per_ha = if net_mm > 0.0 {
        total_cost_usd_per_ha / net_mm
    } else {
        0.0
    };

    ApplicationPlan {
        system,
        gross_water_mm: events.iter().map(|e| e.gross_mm).sum(),
        total_cost_usd_per_ha,
        cost_per_mm_usd_per_ha,
        water_savings_percent: system.water_savings_percent(),
        events,
    }
}

/// 06:00 local solar time, `days_ahead` days after the local date of `as_of`.
fn early_morning(as_of: DateTime<Utc>, location: &Location, days_ahead: i64) -> DateTime<Utc> {
    let offset = Duration::hours(location.solar_offset_hours());
    let local_date = (as_of + offset).date_naive() + Duration::days(days_ahead);
    let local = local_date.and_time(NaiveTime::default()) + Duration::hours(EARLY_MORNING_HOUR);
    Utc.from_utc_datetime(&local) - offset
}
