use viper::{evaluate_program, parse, Environment, Program};

fn main() -> anyhow::Result<()> {
    let programs = vec![
        "let spam = fn() { eggs * 3 };",
        "spam()",
        "let eggs = 20;",
        "spam()",
    ].into_iter()
        .map(|line| parse(line).map(|program| (line, program)))
        .collect::<Result<Vec<(&str, Program)>, _>>()?;

    let environment = Environment::root();
    for (source, program) in &programs {
        match evaluate_program(program, &environment) {
            Some(value) => println!("{}: {}", source, value),
            None => println!("{}", source),
        }
    }

    Ok(())
}
