//! Contiguous action-space indexing (spec §4.6 "Action space").

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyAction {
    Perceive,
    InspectTruck,
    InspectContainer(usize),
    BringGlue(usize),
    BringPart(usize),
}

#[derive(Debug, Clone, Copy)]
pub struct ActionSpace {
    pub num_parts: usize,
    pub num_types: usize,
}

impl ActionSpace {
    pub fn num_actions(&self) -> usize {
        2 + self.num_parts + self.num_types + self.num_parts
    }

    pub fn encode(&self, action: AssemblyAction) -> usize {
        match action {
            AssemblyAction::Perceive => 0,
            AssemblyAction::InspectTruck => 1,
            AssemblyAction::InspectContainer(c) => 2 + c,
            AssemblyAction::BringGlue(t) => 2 + self.num_parts + t,
            AssemblyAction::BringPart(c) => 2 + self.num_parts + self.num_types + c,
        }
    }

    pub fn decode(&self, index: usize) -> AssemblyAction {
        if index == 0 {
            return AssemblyAction::Perceive;
        }
        if index == 1 {
            return AssemblyAction::InspectTruck;
        }
        let index = index - 2;
        if index < self.num_parts {
            return AssemblyAction::InspectContainer(index);
        }
        let index = index - self.num_parts;
        if index < self.num_types {
            return AssemblyAction::BringGlue(index);
        }
        let index = index - self.num_types;
        AssemblyAction::BringPart(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trips_over_full_range() {
        let space = ActionSpace { num_parts: 3, num_types: 2 };
        for i in 0..space.num_actions() {
            let action = space.decode(i);
            assert_eq!(space.encode(action), i);
        }
    }
}
