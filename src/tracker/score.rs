/// Vote weight of a reactor holding the elevated-stake role.
pub const STAKER_WEIGHT: u32 = 3;
/// Vote weight of any other reactor.
pub const DEFAULT_WEIGHT: u32 = 1;

pub fn reaction_weight(is_staker: bool) -> u32 {
    if is_staker {
        STAKER_WEIGHT
    } else {
        DEFAULT_WEIGHT
    }
}
