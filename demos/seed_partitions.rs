use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    trendlines::apps::run_seed_partitions(std::env::args().skip(1))
}
