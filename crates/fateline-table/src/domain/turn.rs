//! Turn order.

/// Result of advancing the active-player pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advance {
    /// Index of the new active player, if anyone is still eligible.
    pub next: Option<usize>,
    /// Whether the scan wrapped past the end of the seat list.
    pub wrapped: bool,
}

/// Finds the next seat after `current` whose player has not won.
///
/// `won` holds one victory flag per seat, in turn order. With no current
/// seat the scan starts at seat 0, and landing there counts as a wrap.
#[must_use]
pub fn next_active(won: &[bool], current: Option<usize>) -> Advance {
    let seats = won.len();
    let none = Advance {
        next: None,
        wrapped: false,
    };
    match current {
        Some(current) => (1..=seats)
            .map(|hop| current + hop)
            .find(|&raw| !won[raw % seats])
            .map_or(none, |raw| Advance {
                next: Some(raw % seats),
                wrapped: raw >= seats,
            }),
        None => won.iter().position(|&w| !w).map_or(none, |index| Advance {
            next: Some(index),
            wrapped: index == 0,
        }),
    }
}
