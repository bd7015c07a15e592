//! Contiguous action-space indexing for the hotel domain (spec §4.7), grounded
//! in `hotel_robot.h`'s `A_PERCEIVE = 0, A_INSPECT_OBJECT = 1,
//! A_INSPECT_CONTAINER = 2, A_BRING_PARTS = 3`. Unlike the assembly variant,
//! `InspectContainer` is a single action returning a bit-vector observation
//! over every container, not one action per container.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotelAction {
    Perceive,
    InspectObject,
    InspectContainer,
    BringPart(usize),
}

#[derive(Debug, Clone, Copy)]
pub struct ActionSpace {
    pub num_parts: usize,
}

impl ActionSpace {
    pub fn num_actions(&self) -> usize {
        3 + self.num_parts
    }

    pub fn encode(&self, action: HotelAction) -> usize {
        match action {
            HotelAction::Perceive => 0,
            HotelAction::InspectObject => 1,
            HotelAction::InspectContainer => 2,
            HotelAction::BringPart(c) => 3 + c,
        }
    }

    pub fn decode(&self, index: usize) -> HotelAction {
        match index {
            0 => HotelAction::Perceive,
            1 => HotelAction::InspectObject,
            2 => HotelAction::InspectContainer,
            _ => HotelAction::BringPart(index - 3),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trips_over_full_range() {
        let space = ActionSpace { num_parts: 5 };
        for i in 0..space.num_actions() {
            let action = space.decode(i);
            assert_eq!(space.encode(action), i);
        }
    }
}
