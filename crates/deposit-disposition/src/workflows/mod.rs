pub mod move_out;
