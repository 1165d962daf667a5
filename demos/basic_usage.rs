//! Basic usage example of derp

use derp::{to_dot, Grammar, GrammarError, Node, Rules};

fn main() -> Result<(), GrammarError> {
    println!("=== derp Basic Usage Example ===\n");

    // Example 1: Grammar built node by node
    println!("Example 1: Sums of ones");
    let mut g = Grammar::new();
    let s = g.recursive(|g, s| {
        let one = g.term('1');
        let plus = g.term('+');
        let tail = g.cat(plus, s);
        let rec = g.cat(s, tail);
        Node::Alt(one, rec)
    });

    for input in ["1", "1+1+1", "1+", "+1"] {
        println!("  {:8} -> {}", format!("{:?}", input), g.match_str(s, input).accepted);
    }
    println!();

    // Example 2: Date recognizer from the rule notation
    println!("Example 2: Dates");
    let mut dates = Rules::parse(
        r#"
        date: year, "-", month, "-", day.
        year: digit, digit, digit, digit.
        month: digit, digit.
        day: digit, digit.
        -digit: ["0"-"9"].
    "#,
    )?;

    for input in ["2024-11-20", "2024-1-20"] {
        println!("  {:12} -> {}", format!("{:?}", input), dates.matches(input));
    }
    println!();

    // Example 3: Left recursion needs no rewriting
    println!("Example 3: Left-recursive lists");
    let mut list = Rules::parse(r#"list: list, ",", item; item. item: ["a"-"z"]+."#)?;
    println!("  \"a,bc,d\" -> {}", list.matches("a,bc,d"));
    println!("  \"a,,d\"   -> {}", list.matches("a,,d"));
    println!();

    // Example 4: Residual grammar of a prefix
    println!("Example 4: What may follow \"1+\"");
    let m = g.match_str(s, "1+");
    println!("{}", to_dot(&g, m.residual));

    Ok(())
}
