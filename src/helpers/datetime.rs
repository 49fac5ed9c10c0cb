use time::{OffsetDateTime, UtcOffset};

pub trait Timezone {
    fn to_localtime(&self) -> OffsetDateTime;
    fn to_formatted_string(&self) -> String;
}

impl Timezone for OffsetDateTime {
    fn to_localtime(&self) -> OffsetDateTime {
        // `UtcOffset::current_local_offset` refuses to work in multi-threaded
        // processes, chrono has no such restriction
        // https://github.com/time-rs/time/discussions/421
        let tz_offset_sec = chrono::Local::now().offset().local_minus_utc();
        match UtcOffset::from_whole_seconds(tz_offset_sec) {
            Ok(offset) => self.to_offset(offset),
            Err(_) => *self,
        }
    }

    // "YYYY-MM-DD HH:MM:SS.mmm"
    fn to_formatted_string(&self) -> String {
        format!(
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:03}",
            self.year(),
            u8::from(self.month()),
            self.day(),
            self.hour(),
            self.minute(),
            self.second(),
            self.millisecond()
        )
    }
}

pub fn now() -> String {
    OffsetDateTime::now_utc().to_localtime().to_formatted_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, Month, PrimitiveDateTime, Time};

    #[test]
    fn formats_with_millis() {
        let dt = PrimitiveDateTime::new(
            Date::from_calendar_date(2024, Month::March, 7).unwrap(),
            Time::from_hms_milli(9, 5, 3, 42).unwrap(),
        )
        .assume_utc();
        assert_eq!(dt.to_formatted_string(), "2024-03-07 09:05:03.042");
    }
}
