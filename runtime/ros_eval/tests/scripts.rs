//! End-to-end script execution through the public `Processor` API.

use pretty_assertions::assert_eq;
use ros_eval::{
    BufferPrint, CoreState, ExitCode, Processor, ProcessorBuilder, SharedPrintHandler, WaitReason,
};
use ros_ir::{block, BinaryOp, Block, Expr, FunctionDef, Name, Stmt};
use ros_value::{EvalErrorKind, Value};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

fn harness() -> (Processor, Rc<RefCell<BufferPrint>>) {
    let buffer = Rc::new(RefCell::new(BufferPrint::default()));
    let printer: SharedPrintHandler = buffer.clone();
    let processor = ProcessorBuilder::new().printer(printer).build();
    (processor, buffer)
}

fn name(processor: &Processor, text: &str) -> Name {
    processor.interner().intern(text)
}

fn print_call(processor: &Processor, args: Vec<Expr>) -> Stmt {
    Stmt::Expr(Expr::call(Expr::Ident(name(processor, "print")), args))
}

fn print_ident(processor: &Processor, ident: &str) -> Stmt {
    print_call(processor, vec![Expr::Ident(name(processor, ident))])
}

fn var(n: Name, init: Expr) -> Stmt {
    Stmt::Var {
        name: n,
        init: Some(init),
    }
}

fn lines(buffer: &Rc<RefCell<BufferPrint>>) -> Vec<String> {
    buffer.borrow().lines().to_vec()
}

fn run(processor: &mut Processor, program: Block) {
    processor.load(program);
    let state = processor.execute().clone();
    assert!(
        state.is_completed(),
        "expected completion, got {state:?}"
    );
}

#[test]
fn print_outputs_through_the_handler() {
    let (mut processor, buffer) = harness();
    let program = block(vec![print_call(&processor, vec![Expr::Str("hello".into())])]);
    run(&mut processor, program);
    assert_eq!(lines(&buffer), ["hello"]);
}

#[test]
fn if_else_chain_picks_the_first_true_arm() {
    let (mut processor, buffer) = harness();
    let x = name(&processor, "x");
    let program = block(vec![
        var(x, Expr::Int(3)),
        Stmt::If {
            arms: vec![
                (
                    Expr::binary(BinaryOp::Gt, Expr::Ident(x), Expr::Int(10)),
                    block(vec![print_call(&processor, vec![Expr::Str("big".into())])]),
                ),
                (
                    Expr::binary(BinaryOp::Gt, Expr::Ident(x), Expr::Int(2)),
                    block(vec![print_call(&processor, vec![Expr::Str("medium".into())])]),
                ),
            ],
            else_body: Some(block(vec![print_call(
                &processor,
                vec![Expr::Str("small".into())],
            )])),
        },
    ]);
    run(&mut processor, program);
    assert_eq!(lines(&buffer), ["medium"]);
}

#[test]
fn unless_runs_when_the_condition_is_false() {
    let (mut processor, buffer) = harness();
    let program = block(vec![Stmt::Unless {
        cond: Expr::Bool(false),
        body: block(vec![print_call(&processor, vec![Expr::Str("ran".into())])]),
        else_body: None,
    }]);
    run(&mut processor, program);
    assert_eq!(lines(&buffer), ["ran"]);
}

#[test]
fn for_loop_counts_down() {
    let (mut processor, buffer) = harness();
    let s = name(&processor, "s");
    let i = name(&processor, "i");
    // var s = ""; for var i = 3; i; i -= 1: s += i
    let program = block(vec![
        var(s, Expr::Str(String::new())),
        Stmt::For {
            init: Some(Box::new(var(i, Expr::Int(3)))),
            cond: Some(Expr::Ident(i)),
            step: Some(Expr::assign_op(i, BinaryOp::Sub, Expr::Int(1))),
            body: block(vec![Stmt::Expr(Expr::assign_op(
                s,
                BinaryOp::Add,
                Expr::Ident(i),
            ))]),
        },
        print_ident(&processor, "s"),
    ]);
    run(&mut processor, program);
    assert_eq!(lines(&buffer), ["321"]);
}

#[test]
fn continue_still_runs_the_step_clause() {
    let (mut processor, buffer) = harness();
    let s = name(&processor, "s");
    let i = name(&processor, "i");
    // odd digits only: "135"
    let program = block(vec![
        var(s, Expr::Str(String::new())),
        Stmt::For {
            init: Some(Box::new(var(i, Expr::Int(1)))),
            cond: Some(Expr::binary(BinaryOp::Le, Expr::Ident(i), Expr::Int(6))),
            step: Some(Expr::assign_op(i, BinaryOp::Add, Expr::Int(1))),
            body: block(vec![
                Stmt::If {
                    arms: vec![(
                        Expr::binary(
                            BinaryOp::Eq,
                            Expr::binary(BinaryOp::Mod, Expr::Ident(i), Expr::Int(2)),
                            Expr::Int(0),
                        ),
                        block(vec![Stmt::Continue]),
                    )],
                    else_body: None,
                },
                Stmt::Expr(Expr::assign_op(s, BinaryOp::Add, Expr::Ident(i))),
            ]),
        },
        print_ident(&processor, "s"),
    ]);
    run(&mut processor, program);
    assert_eq!(lines(&buffer), ["135"]);
}

#[test]
fn break_exits_only_the_inner_loop() {
    let (mut processor, buffer) = harness();
    let s = name(&processor, "s");
    let i = name(&processor, "i");
    let program = block(vec![
        var(s, Expr::Str(String::new())),
        Stmt::For {
            init: Some(Box::new(var(i, Expr::Int(2)))),
            cond: Some(Expr::binary(BinaryOp::Le, Expr::Ident(i), Expr::Int(4))),
            step: Some(Expr::assign_op(i, BinaryOp::Add, Expr::Int(1))),
            body: block(vec![
                Stmt::Expr(Expr::assign_op(s, BinaryOp::Add, Expr::Ident(i))),
                Stmt::While {
                    cond: Expr::Bool(true),
                    body: block(vec![Stmt::Break]),
                },
            ]),
        },
        print_ident(&processor, "s"),
    ]);
    run(&mut processor, program);
    assert_eq!(lines(&buffer), ["234"]);
}

#[test]
fn until_loop_stops_when_the_condition_turns_true() {
    let (mut processor, buffer) = harness();
    let i = name(&processor, "i");
    let program = block(vec![
        var(i, Expr::Int(0)),
        Stmt::Until {
            cond: Expr::binary(BinaryOp::Ge, Expr::Ident(i), Expr::Int(3)),
            body: block(vec![Stmt::Expr(Expr::assign_op(
                i,
                BinaryOp::Add,
                Expr::Int(1),
            ))]),
        },
        print_ident(&processor, "i"),
    ]);
    run(&mut processor, program);
    assert_eq!(lines(&buffer), ["3"]);
}

#[test]
fn do_loop_runs_at_least_once() {
    let (mut processor, buffer) = harness();
    let program = block(vec![Stmt::DoUntil {
        body: block(vec![print_call(&processor, vec![Expr::Str("once".into())])]),
        cond: Expr::Bool(true),
    }]);
    run(&mut processor, program);
    assert_eq!(lines(&buffer), ["once"]);
}

#[test]
fn continue_in_do_until_reevaluates_the_trailing_condition() {
    let (mut processor, buffer) = harness();
    let i = name(&processor, "i");
    let evens = name(&processor, "evens");
    // every odd iteration continues past the counter; the loop still
    // advances and exits once the trailing condition turns true
    let program = block(vec![
        var(i, Expr::Int(0)),
        var(evens, Expr::Int(0)),
        Stmt::DoUntil {
            body: block(vec![
                Stmt::Expr(Expr::assign_op(i, BinaryOp::Add, Expr::Int(1))),
                Stmt::If {
                    arms: vec![(
                        Expr::binary(
                            BinaryOp::Eq,
                            Expr::binary(BinaryOp::Mod, Expr::Ident(i), Expr::Int(2)),
                            Expr::Int(1),
                        ),
                        block(vec![Stmt::Continue]),
                    )],
                    else_body: None,
                },
                Stmt::Expr(Expr::assign_op(evens, BinaryOp::Add, Expr::Int(1))),
            ]),
            cond: Expr::binary(BinaryOp::Ge, Expr::Ident(i), Expr::Int(6)),
        },
        print_ident(&processor, "i"),
        print_ident(&processor, "evens"),
    ]);
    run(&mut processor, program);
    assert_eq!(lines(&buffer), ["6", "3"]);
}

#[test]
fn continue_in_do_while_inside_a_nested_call() {
    let (mut processor, buffer) = harness();
    let f = name(&processor, "f");
    let n = name(&processor, "n");
    let hits = name(&processor, "hits");
    let def = Arc::new(FunctionDef {
        name: f,
        params: vec![],
        body: block(vec![
            var(n, Expr::Int(0)),
            var(hits, Expr::Int(0)),
            Stmt::DoWhile {
                body: block(vec![
                    Stmt::Expr(Expr::assign_op(n, BinaryOp::Add, Expr::Int(1))),
                    Stmt::If {
                        arms: vec![(
                            Expr::binary(
                                BinaryOp::Eq,
                                Expr::binary(BinaryOp::Mod, Expr::Ident(n), Expr::Int(2)),
                                Expr::Int(1),
                            ),
                            block(vec![Stmt::Continue]),
                        )],
                        else_body: None,
                    },
                    Stmt::Expr(Expr::assign_op(hits, BinaryOp::Add, Expr::Int(1))),
                ]),
                cond: Expr::binary(BinaryOp::Lt, Expr::Ident(n), Expr::Int(6)),
            },
            Stmt::Return(Some(Expr::binary(
                BinaryOp::Add,
                Expr::Ident(n),
                Expr::Ident(hits),
            ))),
        ]),
    });
    // the call sits inside print's argument list, so the function body
    // runs on the recursive path
    let program = block(vec![
        Stmt::Function(def),
        print_call(&processor, vec![Expr::call(Expr::Ident(f), vec![])]),
    ]);
    run(&mut processor, program);
    assert_eq!(lines(&buffer), ["9"]);
}

#[test]
fn foreach_iterates_string_characters() {
    let (mut processor, buffer) = harness();
    let c = name(&processor, "c");
    let program = block(vec![Stmt::ForEach {
        var: c,
        seq: Expr::Str("abc".into()),
        body: block(vec![print_ident(&processor, "c")]),
    }]);
    run(&mut processor, program);
    assert_eq!(lines(&buffer), ["a", "b", "c"]);
}

#[test]
fn yield_suspends_between_statements() {
    let (mut processor, buffer) = harness();
    let program = block(vec![
        print_call(&processor, vec![Expr::Str("a".into())]),
        Stmt::Yield,
        print_call(&processor, vec![Expr::Str("b".into())]),
    ]);
    processor.load(program);
    assert_eq!(
        processor.execute(),
        &CoreState::Suspended(WaitReason::Tick)
    );
    assert_eq!(lines(&buffer), ["a"]);
    assert!(processor.resume().is_completed());
    assert_eq!(lines(&buffer), ["a", "b"]);
}

#[test]
fn wait_tracks_remaining_seconds() {
    let (mut processor, buffer) = harness();
    let program = block(vec![
        Stmt::Wait(Some(Expr::Float(1.5))),
        print_call(&processor, vec![Expr::Str("done".into())]),
    ]);
    processor.load(program);
    assert_eq!(
        processor.execute(),
        &CoreState::Suspended(WaitReason::Seconds(1.5))
    );
    assert_eq!(
        processor.resume_with(1.0),
        &CoreState::Suspended(WaitReason::Seconds(0.5))
    );
    assert!(processor.resume_with(0.5).is_completed());
    assert_eq!(lines(&buffer), ["done"]);
}

#[test]
fn plain_resume_does_not_advance_a_timed_wait() {
    let (mut processor, buffer) = harness();
    let program = block(vec![
        Stmt::Wait(Some(Expr::Float(2.0))),
        print_call(&processor, vec![Expr::Str("done".into())]),
    ]);
    processor.load(program);
    processor.execute();
    // ticks without elapsed time leave the wait untouched
    assert_eq!(
        processor.resume(),
        &CoreState::Suspended(WaitReason::Seconds(2.0))
    );
    assert_eq!(
        processor.resume(),
        &CoreState::Suspended(WaitReason::Seconds(2.0))
    );
    assert!(lines(&buffer).is_empty());
    assert!(processor.resume_with(2.0).is_completed());
    assert_eq!(lines(&buffer), ["done"]);
}

#[test]
fn framed_function_call_can_yield() {
    let (mut processor, buffer) = harness();
    let f = name(&processor, "f");
    let def = Arc::new(FunctionDef {
        name: f,
        params: vec![],
        body: block(vec![
            print_call(&processor, vec![Expr::Str("in".into())]),
            Stmt::Yield,
            print_call(&processor, vec![Expr::Str("out".into())]),
        ]),
    });
    let program = block(vec![
        Stmt::Function(def),
        Stmt::Expr(Expr::call(Expr::Ident(f), vec![])),
        print_call(&processor, vec![Expr::Str("end".into())]),
    ]);
    processor.load(program);
    assert_eq!(
        processor.execute(),
        &CoreState::Suspended(WaitReason::Tick)
    );
    assert_eq!(lines(&buffer), ["in"]);
    assert!(processor.resume().is_completed());
    assert_eq!(lines(&buffer), ["in", "out", "end"]);
}

#[test]
fn yield_buried_in_an_expression_fails() {
    let (mut processor, _buffer) = harness();
    let g = name(&processor, "g");
    let x = name(&processor, "x");
    let def = Arc::new(FunctionDef {
        name: g,
        params: vec![],
        body: block(vec![Stmt::Yield]),
    });
    // var x = 1 + g(); the call is not in statement position
    let program = block(vec![
        Stmt::Function(def),
        var(
            x,
            Expr::binary(
                BinaryOp::Add,
                Expr::Int(1),
                Expr::call(Expr::Ident(g), vec![]),
            ),
        ),
    ]);
    processor.load(program);
    let CoreState::Failed(error) = processor.execute() else {
        panic!("expected failure");
    };
    assert!(matches!(
        error.kind,
        EvalErrorKind::ControlFlowError { construct: "yield" }
    ));
}

#[test]
fn closures_capture_their_defining_scope_by_reference() {
    let (mut processor, buffer) = harness();
    let n = name(&processor, "n");
    let bump = name(&processor, "bump");
    let def = Arc::new(FunctionDef {
        name: bump,
        params: vec![],
        body: block(vec![Stmt::Expr(Expr::assign(n, Expr::Int(10)))]),
    });
    let program = block(vec![
        var(n, Expr::Int(1)),
        Stmt::Function(def),
        Stmt::Expr(Expr::call(Expr::Ident(bump), vec![])),
        print_ident(&processor, "n"),
    ]);
    run(&mut processor, program);
    assert_eq!(lines(&buffer), ["10"]);
}

#[test]
fn assigning_an_undefined_name_defines_a_global() {
    let (mut processor, buffer) = harness();
    let g = name(&processor, "g");
    let setg = name(&processor, "setg");
    let def = Arc::new(FunctionDef {
        name: setg,
        params: vec![],
        body: block(vec![Stmt::Expr(Expr::assign(g, Expr::Int(5)))]),
    });
    let program = block(vec![
        Stmt::Function(def),
        Stmt::Expr(Expr::call(Expr::Ident(setg), vec![])),
        print_ident(&processor, "g"),
    ]);
    run(&mut processor, program);
    assert_eq!(lines(&buffer), ["5"]);
}

#[test]
fn countdown_forces_suspension_of_busy_loops() {
    let buffer = Rc::new(RefCell::new(BufferPrint::default()));
    let printer: SharedPrintHandler = buffer.clone();
    let mut processor = ProcessorBuilder::new().printer(printer).countdown(10).build();
    let i = name(&processor, "i");
    let program = block(vec![
        var(i, Expr::Int(0)),
        Stmt::While {
            cond: Expr::binary(BinaryOp::Lt, Expr::Ident(i), Expr::Int(100)),
            body: block(vec![Stmt::Expr(Expr::assign_op(
                i,
                BinaryOp::Add,
                Expr::Int(1),
            ))]),
        },
        print_call(&processor, vec![Expr::Str("done".into())]),
    ]);
    processor.load(program);
    assert_eq!(
        processor.execute(),
        &CoreState::Suspended(WaitReason::Countdown)
    );
    for _ in 0..200 {
        if !processor.state().is_suspended() {
            break;
        }
        processor.resume();
    }
    assert!(processor.state().is_completed());
    assert_eq!(lines(&buffer), ["done"]);
}

#[test]
fn terminate_is_terminal() {
    let (mut processor, _buffer) = harness();
    let program = block(vec![Stmt::Yield, Stmt::Yield]);
    processor.load(program);
    assert!(processor.execute().is_suspended());
    processor.terminate();
    let CoreState::Failed(error) = processor.state() else {
        panic!("expected failure");
    };
    assert!(matches!(error.kind, EvalErrorKind::Terminated));
    // resuming a failed script is a no-op
    assert!(processor.resume().is_failed());
}

#[test]
fn top_level_return_completes_with_the_value() {
    let (mut processor, _buffer) = harness();
    processor.load(block(vec![Stmt::Return(Some(Expr::Int(42)))]));
    processor.execute();
    assert_eq!(processor.result(), Some(&Value::Int(42)));
    assert_eq!(processor.exit(), ExitCode::Return);
}

#[test]
fn execute_after_completion_keeps_the_recorded_result() {
    let (mut processor, _buffer) = harness();
    processor.load(block(vec![Stmt::Return(Some(Expr::Int(42)))]));
    processor.execute();
    processor.execute();
    assert_eq!(processor.result(), Some(&Value::Int(42)));
    assert_eq!(processor.exit(), ExitCode::Return);
}

#[test]
fn falling_off_the_end_reports_exit_none() {
    let (mut processor, _buffer) = harness();
    processor.load(block(vec![Stmt::Expr(Expr::Int(3))]));
    processor.execute();
    assert!(processor.state().is_completed());
    assert_eq!(processor.exit(), ExitCode::None);
    assert_eq!(processor.result(), Some(&Value::Int(3)));
}

#[test]
fn yields_report_yield_until_the_final_return() {
    let (mut processor, _buffer) = harness();
    let program = block(vec![
        Stmt::Yield,
        Stmt::Yield,
        Stmt::Yield,
        Stmt::Return(Some(Expr::Str("done".into()))),
    ]);
    processor.load(program);
    processor.execute();
    for _ in 0..3 {
        assert_eq!(processor.exit(), ExitCode::Yield);
        processor.resume();
    }
    assert_eq!(processor.exit(), ExitCode::Return);
    assert_eq!(processor.result(), Some(&Value::string("done")));
}

#[test]
fn print_formats_template_arguments() {
    let (mut processor, buffer) = harness();
    let program = block(vec![print_call(
        &processor,
        vec![
            Expr::Str("{0} {1:F2}".into()),
            Expr::Int(1),
            Expr::Float(2.5),
        ],
    )]);
    run(&mut processor, program);
    assert_eq!(lines(&buffer), ["1 2.50"]);
}

#[test]
fn print_joins_non_template_arguments() {
    let (mut processor, buffer) = harness();
    let program = block(vec![print_call(
        &processor,
        vec![Expr::Str("a".into()), Expr::Int(1), Expr::Bool(true)],
    )]);
    run(&mut processor, program);
    assert_eq!(lines(&buffer), ["a, 1, true"]);
}

#[test]
fn malformed_template_fails_the_script() {
    let (mut processor, _buffer) = harness();
    let program = block(vec![print_call(
        &processor,
        vec![Expr::Str("hello {0".into()), Expr::Int(42)],
    )]);
    processor.load(program);
    let CoreState::Failed(error) = processor.execute() else {
        panic!("expected failure");
    };
    assert!(error.is_format_error());
}

#[test]
fn string_format_processes_escapes_strictly() {
    let (mut processor, buffer) = harness();
    let t = name(&processor, "t");
    let format = Expr::member(
        Expr::Ident(name(&processor, "string")),
        name(&processor, "format"),
    );
    let program = block(vec![
        var(t, Expr::call(format, vec![Expr::Str("{{}}".into())])),
        print_ident(&processor, "t"),
    ]);
    run(&mut processor, program);
    assert_eq!(lines(&buffer), ["{}"]);
}

#[test]
fn fixed_point_placeholder_rounds_pi() {
    let (mut processor, buffer) = harness();
    let program = block(vec![print_call(
        &processor,
        vec![
            Expr::Str("{0:F5}".into()),
            Expr::Float(std::f64::consts::PI),
        ],
    )]);
    run(&mut processor, program);
    assert_eq!(lines(&buffer), ["3.14159"]);
}

#[test]
fn string_methods_bind_to_their_receiver() {
    let (mut processor, buffer) = harness();
    let call = Expr::call(
        Expr::member(Expr::Str("hello".into()), name(&processor, "substring")),
        vec![Expr::Int(1), Expr::Int(3)],
    );
    let program = block(vec![print_call(&processor, vec![call])]);
    run(&mut processor, program);
    assert_eq!(lines(&buffer), ["ell"]);
}

#[test]
fn compound_assignment_reads_the_previous_value() {
    let (mut processor, buffer) = harness();
    let x = name(&processor, "x");
    let program = block(vec![
        var(x, Expr::Int(5)),
        Stmt::Expr(Expr::assign_op(x, BinaryOp::Add, Expr::Int(2))),
        print_ident(&processor, "x"),
    ]);
    run(&mut processor, program);
    assert_eq!(lines(&buffer), ["7"]);
}

#[test]
fn echo_prints_the_final_result() {
    let buffer = Rc::new(RefCell::new(BufferPrint::default()));
    let printer: SharedPrintHandler = buffer.clone();
    let mut processor = ProcessorBuilder::new().printer(printer).echo(true).build();
    processor.load(block(vec![Stmt::Expr(Expr::binary(
        BinaryOp::Add,
        Expr::Int(1),
        Expr::Int(2),
    ))]));
    assert!(processor.execute().is_completed());
    assert_eq!(lines(&buffer), ["3"]);
}

#[test]
fn host_globals_are_immutable() {
    let (mut processor, _buffer) = harness();
    processor.register_global("altitude", Value::Float(1200.0));
    let altitude = name(&processor, "altitude");
    processor.load(block(vec![Stmt::Expr(Expr::assign(
        altitude,
        Expr::Int(0),
    ))]));
    let CoreState::Failed(error) = processor.execute() else {
        panic!("expected failure");
    };
    assert!(matches!(
        error.kind,
        EvalErrorKind::ImmutableBinding { .. }
    ));
}
