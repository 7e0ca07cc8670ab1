//! Day agenda.

use chrono::{Datelike, Local, NaiveDate};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub id: u64,
    pub title: String,
    pub date: NaiveDate,
    pub time: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Agenda {
    selected: NaiveDate,
    events: Vec<CalendarEvent>,
    next_id: u64,
}

impl Default for Agenda {
    fn default() -> Self {
        Self::new(Local::now().date_naive())
    }
}

impl Agenda {
    /// Agenda open on `today`, seeded with a few events this month.
    pub fn new(today: NaiveDate) -> Self {
        let on_day = |day: u32| today.with_day(day).unwrap_or(today);
        let seed = [
            ("Reunión de trabajo", on_day(11), Some("10:00")),
            ("Dentista", on_day(15), Some("16:30")),
            ("Cumpleaños de Ana", on_day(20), None),
        ];
        let events: Vec<CalendarEvent> = seed
            .iter()
            .enumerate()
            .map(|(i, (title, date, time))| CalendarEvent {
                id: i as u64 + 1,
                title: title.to_string(),
                date: *date,
                time: time.map(str::to_string),
            })
            .collect();
        let next_id = events.len() as u64 + 1;
        Agenda {
            selected: today,
            events,
            next_id,
        }
    }

    pub fn selected(&self) -> NaiveDate {
        self.selected
    }

    pub fn select(&mut self, date: NaiveDate) {
        self.selected = date;
    }

    /// Events of the selected day.
    pub fn events_for_selected(&self) -> Vec<&CalendarEvent> {
        self.events.iter().filter(|e| e.date == self.selected).collect()
    }

    /// Add an event on the selected day. Blank titles are refused.
    pub fn add(&mut self, title: &str, time: Option<&str>) -> Option<u64> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.events.push(CalendarEvent {
            id,
            title: title.to_string(),
            date: self.selected,
            time: time.map(str::trim).filter(|t| !t.is_empty()).map(str::to_string),
        });
        Some(id)
    }

    pub fn delete(&mut self, id: u64) {
        self.events.retain(|e| e.id != id);
    }
}

/// "abril 2025"
pub fn month_label(date: NaiveDate) -> String {
    const MONTHS: [&str; 12] = [
        "enero", "febrero", "marzo", "abril", "mayo", "junio", "julio", "agosto", "septiembre",
        "octubre", "noviembre", "diciembre",
    ];
    format!("{} {}", MONTHS[date.month0() as usize], date.year())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_filter_by_selected_day() {
        let mut agenda = Agenda::new(day(2025, 4, 1));
        assert!(agenda.events_for_selected().is_empty());
        agenda.select(day(2025, 4, 15));
        let events = agenda.events_for_selected();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Dentista");
    }

    #[test]
    fn test_add_and_delete() {
        let mut agenda = Agenda::new(day(2025, 4, 1));
        assert!(agenda.add(" ", None).is_none());
        let id = agenda.add("Examen", Some(" ")).unwrap();
        assert_eq!(agenda.events_for_selected()[0].time, None);
        agenda.delete(id);
        assert!(agenda.events_for_selected().is_empty());
    }

    #[test]
    fn test_month_label() {
        assert_eq!(month_label(day(2025, 4, 11)), "abril 2025");
    }
}
