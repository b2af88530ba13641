//! Count positions command - count reachable positions at each depth.

use std::time::{Duration, SystemTime};

use structopt::StructOpt;
use tilefish::board::color::Color;
use tilefish::board::Board;
use tilefish::move_generation::perft;

use super::Command;

#[derive(StructOpt)]
pub struct CountPositionsArgs {
    #[structopt(short, long, default_value = "4")]
    pub depth: u8,
}

impl Command for CountPositionsArgs {
    fn execute(self) {
        let mut total_positions = 0u64;
        let mut total_duration = Duration::from_secs(0);

        for depth in 1..=self.depth {
            let mut board = Board::starting_position();
            board.recompute_protections();

            let starting_time = SystemTime::now();
            let count = perft(&mut board, Color::White, depth);
            let duration = SystemTime::now()
                .duration_since(starting_time)
                .unwrap_or_default();
            let positions_per_second = count as f64 / duration.as_secs_f64();

            total_positions += count;
            total_duration += duration;

            println!(
                "depth: {}, positions: {}, positions per second: {}",
                depth, count, positions_per_second
            );
        }

        println!(
            "total positions: {}, total duration: {:?}, positions per second: {}",
            total_positions,
            total_duration,
            total_positions as f64 / total_duration.as_secs_f64()
        );
    }
}
