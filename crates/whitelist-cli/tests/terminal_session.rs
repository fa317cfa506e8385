//! Interactive sessions driven through the terminal driver.

use whitelist_app::{DappState, Runtime};
use whitelist_cli::TerminalDriver;
use whitelist_harness::Scenario;

fn output<R>(runtime: &Runtime<TerminalDriver<R, Vec<u8>>, whitelist_harness::SimWallet>) -> String
where
    R: tokio::io::AsyncBufRead + Unpin + Send,
{
    String::from_utf8(runtime.driver().output().clone()).unwrap()
}

#[tokio::test]
async fn enter_joins_the_whitelist() {
    let scenario = Scenario::new(1).prefilled(4);
    let driver = TerminalDriver::new(&b"\nquit\n"[..], Vec::new());
    let mut runtime = Runtime::new(driver, scenario.wallet.clone(), &scenario.config);

    runtime.run().await.unwrap();

    assert_eq!(runtime.app().state(), DappState::Connected { joined: true });
    let out = output(&runtime);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.first(), Some(&"Connect your wallet [enter]"));
    assert!(lines.contains(&"4 have already joined the Whitelist. Join the Whitelist [enter]"));
    assert_eq!(lines.last(), Some(&"5 have already joined the Whitelist. Thanks for joining the Whitelist!"));
}

#[tokio::test]
async fn wrong_network_prints_alert() {
    let scenario = Scenario::new(2);
    scenario.wallet.set_network(1);
    let driver = TerminalDriver::new(&b"quit\n"[..], Vec::new());
    let mut runtime = Runtime::new(driver, scenario.wallet.clone(), &scenario.config);

    runtime.run().await.unwrap();

    assert_eq!(runtime.app().state(), DappState::Disconnected);
    assert!(output(&runtime).contains("! Change the network to Goerli\n"));
}

#[tokio::test]
async fn end_of_input_stops_the_session() {
    let scenario = Scenario::new(3);
    let driver = TerminalDriver::new(&b""[..], Vec::new());
    let mut runtime = Runtime::new(driver, scenario.wallet.clone(), &scenario.config);

    runtime.run().await.unwrap();

    assert!(matches!(runtime.app().state(), DappState::Connected { joined: false }));
}
