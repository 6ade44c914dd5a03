use backtrack_regex::{Nfa, Regex, Symbol};

fn main() {
    env_logger::init();

    let patterns = [
        "abc",
        "ab?c",
        "ab[cd]e",
        "ab[c-f_.]+",
        "(ab|cd)e",
        "a|b|c",
        "a{2,4}",
        "(0|1)(0|1)*@",
        "[a-zA-Z][a-zA-Z0-9_.]+@[a-zA-Z0-9]+.[a-zA-Z]{2,}",
        "a{1,2,3}",
    ];
    let candidates = [
        "abc", "ac", "abce", "abcdef_.", "abe", "cde", "b", "aaa", "1011@",
        "johnsmith@gmail.co", "alice.smith123@email.co.uk",
    ];

    for pattern in patterns {
        println!("=== pattern: {:?} ===", pattern);
        let regex = match Regex::new(pattern) {
            Ok(regex) => regex,
            Err(err) => {
                println!("  parse error: {}", err);
                println!();
                continue;
            }
        };
        print_nfa(regex.nfa());
        for candidate in candidates {
            if regex.is_match(candidate) {
                println!("  matches {:?}", candidate);
            }
        }
        println!();
    }
}

fn print_nfa(nfa: &Nfa) {
    println!("  start state: {}", nfa.start);
    for (id, state) in nfa.states.iter().enumerate() {
        let mut line = format!("  {:>3}:", id);
        if state.start {
            line.push_str(" START");
        }
        if state.accepting {
            line.push_str(" ACCEPT");
        }
        let mut transitions: Vec<_> = state.transitions.iter().collect();
        transitions.sort_by_key(|(symbol, _)| **symbol);
        for (symbol, targets) in transitions {
            line.push_str(&format!(" {}->{:?}", display_symbol(*symbol), targets));
        }
        if !state.epsilon.is_empty() {
            line.push_str(&format!(" eps->{:?}", state.epsilon));
        }
        println!("{}", line);
    }
}

fn display_symbol(symbol: Symbol) -> String {
    match symbol {
        Symbol::Start => "^".to_string(),
        Symbol::End => "$".to_string(),
        Symbol::Byte(byte) => (byte as char).escape_default().to_string(),
    }
}
