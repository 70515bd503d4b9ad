pub mod entrance_fee;
pub mod stage_entrance;
pub mod stage_entrance_part_number;
pub mod storage_cost;
