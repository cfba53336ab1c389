use calendar_db::{EventStore, StoreError};
use calendar_types::{Category, EventValidationError, NewEvent};
use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;
use tracing::{info, warn};

struct Sample {
    title: &'static str,
    category: Category,
    date: NaiveDate,
    times: Option<(NaiveTime, NaiveTime)>,
    description: &'static str,
    location: &'static str,
}

// Evaluated at compile time, so a bad literal fails the build.
const fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => panic!("invalid sample date"),
    }
}

const fn at(hour: u32, minute: u32) -> NaiveTime {
    match NaiveTime::from_hms_opt(hour, minute, 0) {
        Some(time) => time,
        None => panic!("invalid sample time"),
    }
}

/// One event per seeded category; the children's event is all-day.
const SAMPLES: [Sample; 6] = [
    Sample {
        title: "주일예배",
        category: Category::Church,
        date: day(2025, 1, 26),
        times: Some((at(11, 0), at(12, 30))),
        description: "주일 오전 예배",
        location: "본당",
    },
    Sample {
        title: "장년회 모임",
        category: Category::Adult,
        date: day(2025, 1, 27),
        times: Some((at(19, 0), at(21, 0))),
        description: "월례 장년회 모임",
        location: "교육관",
    },
    Sample {
        title: "청년회 예배",
        category: Category::Youth,
        date: day(2025, 1, 29),
        times: Some((at(19, 30), at(21, 0))),
        description: "청년부 수요예배",
        location: "청년부실",
    },
    Sample {
        title: "부녀회 기도회",
        category: Category::Women,
        date: day(2025, 1, 30),
        times: Some((at(10, 0), at(11, 30))),
        description: "목요 기도회",
        location: "기도실",
    },
    Sample {
        title: "학생회 모임",
        category: Category::Student,
        date: day(2025, 1, 31),
        times: Some((at(18, 0), at(20, 0))),
        description: "금요일 중고등부 모임",
        location: "학생부실",
    },
    Sample {
        title: "유년회 성경학교",
        category: Category::Children,
        date: day(2025, 2, 1),
        times: None,
        description: "어린이 성경학교",
        location: "유아부실",
    },
];

/// The fixed sample events, in insertion order.
pub fn sample_events() -> Vec<NewEvent> {
    SAMPLES
        .iter()
        .map(|sample| {
            let event = match sample.times {
                Some((start, end)) => {
                    NewEvent::timed(sample.title, sample.category, sample.date, start, end)
                }
                None => NewEvent::all_day(sample.title, sample.category, sample.date),
            };
            event
                .with_description(sample.description)
                .with_location(sample.location)
        })
        .collect()
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("event #{index} ({title:?}) is invalid: {source}")]
    Invalid {
        index: usize,
        title: String,
        #[source]
        source: EventValidationError,
    },

    #[error("insert failed: {0}")]
    Store(#[from] StoreError),
}

/// Inserts `events` as one batch. Rows are not deduplicated: loading the
/// same list twice stores it twice.
pub async fn load<S: EventStore>(store: &S, events: &[NewEvent]) -> Result<usize, LoadError> {
    for (index, event) in events.iter().enumerate() {
        event.validate().map_err(|source| LoadError::Invalid {
            index,
            title: event.title.clone(),
            source,
        })?;
    }

    match store.insert_events(events).await {
        Ok(inserted) => {
            info!(inserted, "Sample events inserted");
            Ok(inserted)
        }
        Err(e) => {
            warn!(error = %e, "Sample insert failed");
            Err(e.into())
        }
    }
}
