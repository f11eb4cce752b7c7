/// Contact material category carried by every body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum MaterialId {
    #[default]
    Default = 0,
    Finger = 1,
    Plush = 2,
    Case = 3,
}

impl MaterialId {
    pub fn from_raw(raw: u128) -> Self {
        match raw {
            1 => MaterialId::Finger,
            2 => MaterialId::Plush,
            3 => MaterialId::Case,
            _ => MaterialId::Default,
        }
    }

    pub fn raw(self) -> u128 {
        self as u8 as u128
    }
}

/// Friction and restitution for a pair of materials
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPair {
    pub friction: f32,
    pub restitution: f32,
}

const DEFAULT_PAIR: ContactPair = ContactPair {
    friction: 0.6,
    restitution: 0.05,
};

/// Symmetric lookup. Pairs without an entry use the default/default contact.
pub fn contact_for(a: MaterialId, b: MaterialId) -> ContactPair {
    use MaterialId::*;
    let pair = |friction, restitution| ContactPair {
        friction,
        restitution,
    };
    match (a, b) {
        (Finger, Default) | (Default, Finger) => pair(0.95, 0.02),
        (Finger, Plush) | (Plush, Finger) => pair(1.0, 0.02),
        (Finger, Case) | (Case, Finger) => pair(0.75, 0.02),
        (Default, Plush) | (Plush, Default) => pair(0.7, 0.05),
        (Default, Case) | (Case, Default) => pair(0.5, 0.03),
        _ => DEFAULT_PAIR,
    }
}
