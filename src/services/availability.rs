//! Comprobación de solapamiento de intervalos
//!
//! Este módulo contiene la regla central de disponibilidad: dos rangos
//! de fechas entran en conflicto bajo semántica de límites inclusivos.
//! Sólo las filas con estado activo participan en los chequeos; los
//! repositorios aplican el mismo predicado en SQL.

use chrono::{DateTime, Utc};

/// Rango de fechas cerrado con inicio < fin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        if start < end {
            Some(Self { start, end })
        } else {
            None
        }
    }
}

/// Dos rangos entran en conflicto si comparten al menos un instante,
/// incluidos los extremos: s1 <= e2 && s2 <= e1.
/// Tocar en un único punto (e1 == s2) cuenta como conflicto.
pub fn ranges_overlap(a: DateRange, b: DateRange) -> bool {
    a.start <= b.end && b.start <= a.end
}

/// Comprueba el rango candidato contra una colección de rangos existentes
pub fn conflicts_with_any<'a, I>(candidate: DateRange, existing: I) -> bool
where
    I: IntoIterator<Item = &'a DateRange>,
{
    existing.into_iter().any(|range| ranges_overlap(candidate, *range))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn range(start_day: u32, start_hour: u32, end_day: u32, end_hour: u32) -> DateRange {
        DateRange::new(
            Utc.with_ymd_and_hms(2025, 1, start_day, start_hour, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, end_day, end_hour, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let a = range(1, 10, 3, 10);
        let b = range(2, 10, 4, 10);
        assert_eq!(ranges_overlap(a, b), ranges_overlap(b, a));

        let c = range(10, 0, 11, 0);
        assert_eq!(ranges_overlap(a, c), ranges_overlap(c, a));
    }

    #[test]
    fn test_overlap_is_reflexive() {
        let a = range(1, 10, 2, 10);
        assert!(ranges_overlap(a, a));
    }

    #[test]
    fn test_boundary_touch_is_a_conflict() {
        // [01-01 10:00, 01-02 10:00] vs [01-02 10:00, 01-03 10:00]
        let booked = range(1, 10, 2, 10);
        let requested = range(2, 10, 3, 10);
        assert!(ranges_overlap(booked, requested));
    }

    #[test]
    fn test_disjoint_ranges_do_not_conflict() {
        let a = range(1, 10, 2, 10);
        let b = range(2, 11, 3, 10);
        assert!(!ranges_overlap(a, b));
        assert!(!ranges_overlap(b, a));
    }

    #[test]
    fn test_containment_is_a_conflict() {
        let outer = range(1, 0, 10, 0);
        let inner = range(3, 0, 4, 0);
        assert!(ranges_overlap(outer, inner));
        assert!(ranges_overlap(inner, outer));
    }

    #[test]
    fn test_conflicts_with_any() {
        let existing = vec![range(1, 10, 2, 10), range(5, 10, 6, 10)];
        assert!(conflicts_with_any(range(5, 12, 5, 18), &existing));
        assert!(!conflicts_with_any(range(3, 0, 4, 0), &existing));
    }

    #[test]
    fn test_date_range_rejects_inverted_bounds() {
        let start = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert!(DateRange::new(start, end).is_none());
        assert!(DateRange::new(start, start).is_none());
    }
}
