use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    trendlines::apps::run_compare_platforms(std::env::args().skip(1))
}
