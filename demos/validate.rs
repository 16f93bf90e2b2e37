use failfast::{CancelSignal, Config, UnitFailure, WorkFn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    eprintln!("all positive {:?}", run(vec![1, 2, 10]).await?);
    eprintln!("some negative {:?}", run(vec![1, 2, -3, 10]).await?);
    Ok(())
}

/// Validate every input concurrently; the first negative one stops the batch.
pub async fn run(inputs: Vec<i32>) -> anyhow::Result<Result<Vec<i32>, UnitFailure>> {
    let cfg = Config {
        tasks: inputs.len(),
        ..Config::default()
    };
    let work = WorkFn::new(move |i: usize, _signal: CancelSignal| {
        let input = inputs[i];
        async move { validate(i, input) }
    });

    let report = failfast::fan_out(&cfg, work).await?;
    Ok(match report.error {
        Some(err) => Err(err),
        None => Ok(report.values),
    })
}

fn validate(index: usize, input: i32) -> Result<i32, UnitFailure> {
    if input < 0 {
        return Err(UnitFailure::at(index));
    }
    Ok(input)
}
