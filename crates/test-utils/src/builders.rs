#![allow(dead_code)]

use pf::orchestrator::ExecutionRequest;
use pf::taskfile::{CommandLine, Task};

/// Builder for `Task` to simplify test setup.
pub struct TaskBuilder {
    task: Task,
}

impl TaskBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            task: Task::new(name),
        }
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.task.description = Some(desc.to_string());
        self
    }

    pub fn command(mut self, line: &str) -> Self {
        self.task.commands.push(CommandLine::plain(line));
        self
    }

    pub fn polyglot_command(mut self, lang: &str, line: &str) -> Self {
        self.task.commands.push(CommandLine::polyglot(line, lang));
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.task.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn host(mut self, host: &str) -> Self {
        self.task.hosts.push(host.to_string());
        self
    }

    pub fn sudo(mut self) -> Self {
        self.task.sudo = true;
        self
    }

    pub fn sudo_user(mut self, user: &str) -> Self {
        self.task.sudo = true;
        self.task.sudo_user = Some(user.to_string());
        self
    }

    pub fn build(self) -> Task {
        self.task
    }
}

/// Builder for `ExecutionRequest`.
pub struct RequestBuilder {
    request: ExecutionRequest,
}

impl RequestBuilder {
    pub fn new(task_name: &str) -> Self {
        Self {
            request: ExecutionRequest::for_task(task_name),
        }
    }

    pub fn file(mut self, path: &str) -> Self {
        self.request.file = Some(path.to_string());
        self
    }

    pub fn hosts(mut self, hosts: &str) -> Self {
        self.request.hosts = Some(hosts.to_string());
        self
    }

    pub fn env(mut self, entry: &str) -> Self {
        self.request.env.push(entry.to_string());
        self
    }

    pub fn dry_run(mut self) -> Self {
        self.request.dry_run = true;
        self
    }

    pub fn parallel(mut self) -> Self {
        self.request.parallel = true;
        self
    }

    pub fn task_arg(mut self, arg: &str) -> Self {
        self.request.task_args.push(arg.to_string());
        self
    }

    pub fn build(self) -> ExecutionRequest {
        self.request
    }
}
