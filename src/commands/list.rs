use crmpilot_runner::scenarios;

pub fn list() {
    for module in scenarios::module_names() {
        println!("{module}");
        for scenario in scenarios::for_module(module) {
            println!("  {:<45} {}", scenario.name, scenario.description);
        }
    }
}
