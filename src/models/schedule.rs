use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Day {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

// canonical code, Spanish full name, Spanish abbreviation, English name
static DAY_TABLE: [(Day, &str, &str, &str, &str); 7] = [
    (Day::Mon, "MON", "LUNES", "LUN", "MONDAY"),
    (Day::Tue, "TUE", "MARTES", "MAR", "TUESDAY"),
    (Day::Wed, "WED", "MIERCOLES", "MIE", "WEDNESDAY"),
    (Day::Thu, "THU", "JUEVES", "JUE", "THURSDAY"),
    (Day::Fri, "FRI", "VIERNES", "VIE", "FRIDAY"),
    (Day::Sat, "SAT", "SABADO", "SAB", "SATURDAY"),
    (Day::Sun, "SUN", "DOMINGO", "DOM", "SUNDAY"),
];

impl Day {
    /// Accepts canonical codes, Spanish names or abbreviations (accented or not)
    /// and English names. Anything else is unset.
    pub fn normalize(raw: &str) -> Option<Day> {
        let folded: String = raw
            .trim()
            .to_uppercase()
            .chars()
            .map(|c| match c {
                'Á' => 'A',
                'É' => 'E',
                'Í' => 'I',
                'Ó' => 'O',
                'Ú' => 'U',
                other => other,
            })
            .collect();

        if folded.is_empty() {
            return None;
        }

        DAY_TABLE
            .iter()
            .find(|(_, code, full, abbr, english)| {
                folded == *code || folded == *full || folded == *abbr || folded == *english
            })
            .map(|(day, ..)| *day)
    }

    pub fn code(self) -> &'static str {
        self.entry().1
    }

    /// Name the academic service stores for this day.
    pub fn backend_name(self) -> &'static str {
        self.entry().2
    }

    fn entry(self) -> &'static (Day, &'static str, &'static str, &'static str, &'static str) {
        let index = match self {
            Day::Mon => 0,
            Day::Tue => 1,
            Day::Wed => 2,
            Day::Thu => 3,
            Day::Fri => 4,
            Day::Sat => 5,
            Day::Sun => 6,
        };
        &DAY_TABLE[index]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Modality {
    InPerson,
    Virtual,
    Hybrid,
}

impl Modality {
    pub fn code(self) -> i64 {
        match self {
            Modality::InPerson => 1,
            Modality::Virtual => 2,
            Modality::Hybrid => 3,
        }
    }

    pub fn from_code(code: i64) -> Option<Modality> {
        match code {
            1 => Some(Modality::InPerson),
            2 => Some(Modality::Virtual),
            3 => Some(Modality::Hybrid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomType {
    Room,
    Lab,
    Auditorium,
    MobileRoom,
    AccessibleRoom,
}

impl RoomType {
    pub fn code(self) -> i64 {
        match self {
            RoomType::Room => 1,
            RoomType::Lab => 2,
            RoomType::Auditorium => 3,
            RoomType::MobileRoom => 4,
            RoomType::AccessibleRoom => 5,
        }
    }

    pub fn from_code(code: i64) -> Option<RoomType> {
        match code {
            1 => Some(RoomType::Room),
            2 => Some(RoomType::Lab),
            3 => Some(RoomType::Auditorium),
            4 => Some(RoomType::MobileRoom),
            5 => Some(RoomType::AccessibleRoom),
            _ => None,
        }
    }
}

/// One weekly time slot of a course request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRow {
    pub day: Option<Day>,
    pub start_time: String,
    pub end_time: String,
    pub modality: Option<Modality>,
    pub room_type: Option<RoomType>,
    pub disability: bool,
    /// Derived duration in hours.
    #[serde(default)]
    pub total: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePatch {
    pub day: Option<Day>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub modality: Option<Modality>,
    pub room_type: Option<RoomType>,
    pub disability: Option<bool>,
}

impl ScheduleRow {
    pub fn apply(&mut self, patch: SchedulePatch) {
        if let Some(day) = patch.day {
            self.day = Some(day);
        }
        if let Some(start) = patch.start_time {
            self.start_time = start;
        }
        if let Some(end) = patch.end_time {
            self.end_time = end;
        }
        if let Some(modality) = patch.modality {
            self.modality = Some(modality);
        }
        if let Some(room_type) = patch.room_type {
            self.room_type = Some(room_type);
        }
        if let Some(disability) = patch.disability {
            self.disability = disability;
        }
        self.recompute();
    }

    pub fn recompute(&mut self) {
        self.total = duration_hours(&self.start_time, &self.end_time);
    }

    pub fn is_complete(&self) -> bool {
        self.day.is_some()
            && parse_time(&self.start_time).is_some()
            && parse_time(&self.end_time).is_some()
            && self.modality.is_some()
            && self.room_type.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.day.is_none()
            && self.start_time.trim().is_empty()
            && self.end_time.trim().is_empty()
            && self.modality.is_none()
            && self.room_type.is_none()
            && !self.disability
    }
}

/// Accepts `HH:MM` and `HH:MM:SS`.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

/// Hours between `start` and `end`, floored to two decimals; zero unless `end > start`.
pub fn duration_hours(start: &str, end: &str) -> f64 {
    match (parse_time(start), parse_time(end)) {
        (Some(start), Some(end)) if end > start => {
            let minutes = (end - start).num_minutes();
            // whole hundredths of an hour, floored
            (minutes * 100 / 60) as f64 / 100.0
        }
        _ => 0.0,
    }
}

/// `HH:MM` view of a time coming back from the service.
pub fn to_minutes_precision(raw: &str) -> String {
    parse_time(raw)
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_default()
}

/// `HH:MM:SS` form the service expects.
pub fn with_seconds(raw: &str) -> String {
    parse_time(raw)
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| format!("{}:00", raw.trim()))
}
