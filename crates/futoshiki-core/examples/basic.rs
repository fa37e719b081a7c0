//! Basic example of using the Futoshiki engine

use futoshiki_core::{Grid, Solver};

// Guardian 2020-02-20 Easy
const PUZZLE: &str = "\
· > ·   ·   ·   ·
^   v
4   ·   · < ·   ·
v       ^
2   4   ·   ·   ·
        ^       ^
·   ·   · > · < ·
            ^   v
·   ·   ·   · > ·";

fn main() {
    env_logger::init();

    let grid = Grid::parse(PUZZLE).expect("well-formed puzzle text");
    println!("Puzzle:");
    println!("{}\n", grid);
    println!("Filled cells: {}", grid.filled_count());
    println!("Empty cells: {}\n", grid.empty_count());

    let solver = Solver::new();
    println!("Consistent: {}\n", solver.is_consistent(&grid));

    // Walk the puzzle one hint at a time.
    let mut working = grid.clone();
    let solution = solver.solve(&grid).expect("published puzzle must solve");
    let mut move_no = 1;
    while let Some(hint) = solver.get_hint(&working) {
        println!("Move {} [{}]: {}", move_no, hint.rule, hint.explanation);
        // The hint names the cell; fill it from the solution, as a player
        // following the suggestion would.
        let v = solution.value(hint.row, hint.col).unwrap();
        working = working.set(hint.row, hint.col, v);
        move_no += 1;
        if working.is_filled() {
            break;
        }
    }

    println!("\nSolved:");
    println!("{}", working);
}
