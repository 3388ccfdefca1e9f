use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    edu_corpus::cli::run_generate(std::env::args().skip(1))
}
