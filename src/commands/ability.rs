use crate::prelude::*;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AbilityCommand;

impl Cmd for AbilityCommand {
    fn aliases(&self) -> Vec<&'static str> {
        vec!["ability"]
    }

    fn execute(&self, event: &CmdEvent, dispatcher: &Dispatcher) -> MsgEvent {
        let result = match event.sender {
            CmdSender::Console => Err(AbilityError::WrongSenderType),
            CmdSender::Player(uuid) => {
                let arg = event.args.front().map_or("", String::as_str);
                dispatcher.dispatch(uuid, arg)
            }
        };

        match result {
            Ok(ability) => MsgEvent::new(event.sender, ability.color(), ability.flavor()),
            Err(error) => {
                let color = match error {
                    AbilityError::InvalidArgument(ArgumentError::Missing) => ChatColor::Yellow,
                    _ => ChatColor::Red,
                };

                MsgEvent::new(event.sender, color, error.to_string())
            }
        }
    }
}
