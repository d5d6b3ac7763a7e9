//! Free slot search over a window and a set of busy intervals.

use chrono::{DateTime, Duration, Utc};

use super::types::{BusyInterval, SlotCandidate};

/// Gap kept between consecutive proposals so meetings are never
/// suggested back to back.
pub const SLOT_BUFFER_MINUTES: i64 = 5;

pub const DEFAULT_MAX_SUGGESTIONS: usize = 3;

/// Greedy sweep from `window_start` that proposes up to
/// `max_suggestions` start times for a meeting of `duration_minutes`.
///
/// Whenever the candidate overlaps a busy interval the cursor jumps to
/// the end of that interval and the candidate is checked again. An
/// accepted candidate moves the cursor forward by the duration plus
/// [`SLOT_BUFFER_MINUTES`].
///
/// Busy intervals may arrive in any order and may overlap each
/// other. They are sorted by start so the scan can stop at the first
/// interval that begins after the candidate ends; jumping to the end
/// of an overlapping interval never skips a free position, so the
/// result does not depend on the input order.
pub fn find_slots(
    busy: &[BusyInterval],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    duration_minutes: u32,
    max_suggestions: usize,
) -> Vec<SlotCandidate> {
    let duration = Duration::minutes(i64::from(duration_minutes));
    let step = duration + Duration::minutes(SLOT_BUFFER_MINUTES);

    let mut sorted: Vec<&BusyInterval> = busy.iter().collect();
    sorted.sort_by_key(|b| b.start);

    let mut slots = Vec::new();
    let mut cursor = window_start;

    while slots.len() < max_suggestions {
        // Running past the last representable instant ends the sweep
        let Some(candidate_end) = cursor.checked_add_signed(duration) else {
            break;
        };
        if candidate_end > window_end {
            break;
        }
        let conflict = sorted
            .iter()
            .take_while(|b| b.start < candidate_end)
            .find(|b| b.overlaps(cursor, candidate_end));

        match conflict {
            Some(b) => {
                tracing::trace!("Slot at {} conflicts with busy period ending {}", cursor, b.end);
                cursor = b.end;
            }
            None => {
                slots.push(SlotCandidate { start: cursor });
                match cursor.checked_add_signed(step) {
                    Some(next) => cursor = next,
                    None => break,
                }
            }
        }
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 4, h, m, 0).unwrap()
    }

    fn busy(start: (u32, u32), end: (u32, u32)) -> BusyInterval {
        BusyInterval::new(at(start.0, start.1), at(end.0, end.1))
    }

    fn starts(slots: &[SlotCandidate]) -> Vec<DateTime<Utc>> {
        slots.iter().map(|s| s.start).collect()
    }

    /// Brute force reference: every minute offset that fits, respecting
    /// the buffer after each accepted slot.
    fn exhaustive(
        busy: &[BusyInterval],
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        duration_minutes: u32,
    ) -> Vec<DateTime<Utc>> {
        let duration = Duration::minutes(i64::from(duration_minutes));
        let mut out: Vec<DateTime<Utc>> = Vec::new();
        let mut t = window_start;
        while t + duration <= window_end {
            let free = busy.iter().all(|b| !b.overlaps(t, t + duration));
            let spaced = out.last().is_none_or(|prev| {
                t >= *prev + duration + Duration::minutes(SLOT_BUFFER_MINUTES)
            });
            if free && spaced {
                out.push(t);
            }
            t += Duration::minutes(1);
        }
        out
    }

    #[test]
    fn it_proposes_back_to_back_slots_with_buffer_in_an_empty_window() {
        let slots = find_slots(&[], at(9, 0), at(17, 0), 30, 3);
        assert_eq!(starts(&slots), vec![at(9, 0), at(9, 35), at(10, 10)]);
    }

    #[test]
    fn it_starts_after_a_leading_busy_period() {
        let slots = find_slots(&[busy((9, 0), (10, 0))], at(9, 0), at(17, 0), 30, 3);
        assert_eq!(slots[0].start, at(10, 0));
    }

    #[test]
    fn it_returns_nothing_when_the_window_is_too_short() {
        let slots = find_slots(&[], at(9, 0), at(9, 20), 30, 3);
        assert!(slots.is_empty());
    }

    #[test]
    fn it_accepts_a_slot_that_exactly_fills_the_window() {
        let slots = find_slots(&[], at(9, 0), at(9, 30), 30, 3);
        assert_eq!(starts(&slots), vec![at(9, 0)]);
    }

    #[test]
    fn it_returns_nothing_when_max_suggestions_is_zero() {
        assert!(find_slots(&[], at(9, 0), at(17, 0), 30, 0).is_empty());
    }

    #[test]
    fn it_handles_unsorted_and_overlapping_busy_periods() {
        let busy = vec![
            busy((11, 0), (11, 45)),
            busy((9, 10), (9, 50)),
            busy((9, 0), (9, 20)),
            busy((9, 40), (10, 30)),
        ];
        let slots = find_slots(&busy, at(9, 0), at(12, 30), 30, 5);
        assert_eq!(starts(&slots), vec![at(10, 30), at(11, 45)]);
    }

    #[test]
    fn it_fits_a_slot_into_an_exact_gap() {
        let busy = vec![busy((9, 0), (10, 0)), busy((10, 30), (17, 0))];
        let slots = find_slots(&busy, at(9, 0), at(17, 0), 30, 3);
        assert_eq!(starts(&slots), vec![at(10, 0)]);
    }

    #[test]
    fn it_ignores_busy_periods_outside_the_window() {
        let busy = vec![busy((7, 0), (8, 0)), busy((18, 0), (19, 0))];
        let slots = find_slots(&busy, at(9, 0), at(10, 0), 20, 10);
        assert_eq!(starts(&slots), vec![at(9, 0), at(9, 25)]);
    }

    #[test]
    fn it_never_returns_conflicting_or_crowded_slots() {
        let busy = vec![
            busy((9, 45), (10, 15)),
            busy((12, 0), (13, 0)),
            busy((10, 50), (11, 5)),
            busy((14, 10), (14, 20)),
            busy((12, 30), (12, 45)),
        ];
        for duration in [15, 25, 30, 45, 60] {
            let slots = find_slots(&busy, at(9, 0), at(17, 0), duration, 100);
            let d = Duration::minutes(i64::from(duration));
            for slot in &slots {
                assert!(slot.start >= at(9, 0));
                assert!(slot.start + d <= at(17, 0));
                assert!(busy.iter().all(|b| !b.overlaps(slot.start, slot.start + d)));
            }
            for pair in slots.windows(2) {
                assert!(pair[1].start >= pair[0].start + d + Duration::minutes(SLOT_BUFFER_MINUTES));
            }
        }
    }

    #[test]
    fn it_matches_an_exhaustive_scan() {
        let busy = vec![
            busy((9, 45), (10, 15)),
            busy((12, 0), (13, 0)),
            busy((10, 50), (11, 5)),
            busy((14, 10), (14, 20)),
        ];
        for duration in [10, 30, 45, 90] {
            let expected = exhaustive(&busy, at(9, 0), at(17, 0), duration);
            for max in [1, 3, 7, 100] {
                let slots = find_slots(&busy, at(9, 0), at(17, 0), duration, max);
                let want: Vec<_> = expected.iter().take(max).cloned().collect();
                assert_eq!(starts(&slots), want, "duration {} max {}", duration, max);
            }
        }
    }

    #[test]
    fn it_terminates_for_zero_duration() {
        let slots = find_slots(&[busy((9, 0), (9, 10))], at(9, 0), at(9, 30), 0, 10);
        assert_eq!(
            starts(&slots),
            vec![at(9, 0), at(9, 10), at(9, 15), at(9, 20), at(9, 25), at(9, 30)]
        );
    }

    #[test]
    fn it_stops_at_the_last_representable_instant() {
        let end = DateTime::<Utc>::MAX_UTC;
        let start = end - Duration::minutes(20);
        let slots = find_slots(&[], start, end, 10, 3);
        assert_eq!(starts(&slots), vec![start]);

        // Jumping to a busy period that runs to the end leaves no room
        let slots = find_slots(&[BusyInterval::new(start, end)], start, end, 10, 3);
        assert!(slots.is_empty());
    }
}
