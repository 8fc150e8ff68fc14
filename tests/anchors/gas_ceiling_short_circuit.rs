use std::fs;

#[test]
fn executor_gates_on_gas_ceiling_before_signing() {
    let source = fs::read_to_string("src/executor/mod.rs")
        .expect("src/executor/mod.rs must be readable for gas gate audit");

    for needle in [
        "chain.max_gas_price_wei > 0",
        "OutcomeClass::GasTooHigh",
        "self.signer.submit(&request)",
    ] {
        assert!(
            source.contains(needle),
            "executor must contain `{needle}` for the cost-avoidance gate"
        );
    }

    let gate_at = source
        .find("OutcomeClass::GasTooHigh")
        .expect("gate present");
    let submit_at = source
        .find("self.signer.submit(&request)")
        .expect("submit present");
    assert!(
        gate_at < submit_at,
        "the gas ceiling check must come before the signer invocation"
    );
}
