use std::process::ExitCode;

fn main() -> ExitCode {
    match food_price_anomaly::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
