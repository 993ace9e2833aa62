use std::env;

use chebfun::chebfunerror::ChebfunError;
use chebfun::configuration::Preferences;
use chebfun::math::curve::chebfun::piecewisefunction::PiecewiseFunction;

fn main() -> Result<(), ChebfunError> {
    let preferences = match env::args().nth(1) {
        Some(config_path) => Preferences::from_reader(&config_path)?,
        None => Preferences::default(),
    };

    let f = PiecewiseFunction::from_function_adaptive_with(
        |x: f64| (3.0 * x).sin() + 0.5 * (30.0 * x).cos(),
        &[-2.0, 0.0, 1.0, 2.0],
        &preferences,
    )?;
    println!("{}", f);
    println!("integral = {:.15}", f.sum());
    println!("roots = {:?}", f.roots_with(&preferences));

    let g = f.cumsum();
    println!("antiderivative at the right end = {:.15}", g.value(2.0));
    Ok(())
}
